//! Shared fixtures for integration tests.

use hbrip::config::Config;
use hbrip_scan::{parse_scan_output, Source};

/// A realistic scan of a DVD with three titles: the feature (twice, as DVDs
/// like to do), and a short extra. No explicit main-feature marker, so the
/// parser's longest-title fallback decides.
pub const SCAN_TEXT: &str = "\
[11:22:33] hb_init: starting libhb thread
libdvdnav: Using dvdnav version 4.1.3
libdvdnav: DVD Title: BIG_NIGHT_OUT
libdvdnav: DVD Serial Number: 3f1a9c02
libdvdnav: DVD Title (Alternative): Big Night Out
[11:22:34] scan: DVD has 3 title(s)
+ title 1:
  + vts 1, ttn 1, cells 0->11 (1042304 blocks)
  + duration: 01:32:07
  + size: 720x576, pixel aspect: 64/45, display aspect: 1.78, 25.000 fps
  + chapters:
    + 1: cells 0->0, 113187 blocks, duration 00:04:17
    + 2: cells 1->1, 421970 blocks, duration 00:17:40
    + 3: cells 2->11, 507147 blocks, duration 01:10:10
  + audio tracks:
    + 1, English (AC3) (5.1 ch) (iso639-2: eng), 48000Hz, 448000bps
    + 2, Deutsch (AC3) (5.1 ch) (iso639-2: deu), 48000Hz, 448000bps
    + 3, English (AC3) (Director's Commentary) (2.0 ch) (iso639-2: eng), 48000Hz, 192000bps
  + subtitles:
    + 1, English (iso639-2: eng)
    + 2, Deutsch (iso639-2: deu)
    + 3, English (Closed Caption) (iso639-2: eng)
+ title 2:
  + vts 1, ttn 2, cells 12->12 (1042304 blocks)
  + duration: 01:32:07
  + size: 720x576, pixel aspect: 64/45, display aspect: 1.78, 25.000 fps
  + chapters:
    + 1: cells 0->0, 1042304 blocks, duration 01:32:07
  + audio tracks:
    + 1, English (AC3) (5.1 ch) (iso639-2: eng), 48000Hz, 448000bps
  + subtitles:
    + 1, English (iso639-2: eng)
+ title 3:
  + vts 2, ttn 1, cells 0->2 (98777 blocks)
  + duration: 00:08:21
  + size: 720x576, pixel aspect: 16/15, display aspect: 1.33, 25.000 fps
  + chapters:
    + 1: cells 0->2, 98777 blocks, duration 00:08:21
  + audio tracks:
    + 1, Deutsch (AC3) (2.0 ch) (iso639-2: deu), 48000Hz, 192000bps
  + subtitles:
";

/// Parse the fixture as a disc-directory source.
pub fn scanned_source() -> Source {
    parse_scan_output("/media/BIG_NIGHT_OUT/VIDEO_TS", SCAN_TEXT)
}

/// Default config with an output template set.
pub fn config_with_template(template: &str) -> Config {
    let mut config = Config::default();
    config.output.template = Some(template.to_string());
    config
}
