use proptest::prelude::*;

use reelforge_media_model::{Resolution, StreamMetadata, TimeWindow};

proptest! {
    #[test]
    fn resolution_display_parse_round_trip(width in 1u32..=8192, height in 1u32..=8192) {
        let res = Resolution::new(width, height).unwrap();
        let parsed: Resolution = res.to_string().parse().unwrap();
        prop_assert_eq!(parsed, res);
    }

    #[test]
    fn window_end_never_precedes_start(start in 0.0f64..1e6, duration in 0.0f64..1e6) {
        let window = TimeWindow::new(start, duration);
        prop_assert!(window.is_valid());
        prop_assert!(window.end_secs() >= window.start_secs);
    }

    #[test]
    fn fps_rational_matches_quotient(num in 1u32..=240_000, den in 1u32..=1001) {
        let meta = StreamMetadata {
            width: 1,
            height: 1,
            codec: "h264".to_string(),
            fps: format!("{num}/{den}"),
            duration_secs: 0.0,
        };
        let fps = meta.fps_f64().unwrap();
        prop_assert!((fps - num as f64 / den as f64).abs() < 1e-9);
    }
}
