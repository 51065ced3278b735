//! # Simulated Video Analysis
//!
//! Canned object detection results.
//!
//! ## Live
//!
//! | `tick mod 5` | Objects | Warnings |
//! |---|---|---|
//! | 0 | person, chair, staircase | staircase |
//! | 1 | door, curb | curb |
//! | 2 | exit sign, person | - |
//! | 3 | vehicle | vehicle |
//! | 4 | scene 0 + puddle | staircase, puddle |
//!
//! The remainder is Euclidean, so every tick (negative included) lands in `0..5`.
//!
//! ## Upload
//!
//! Fixed text sign + person, with the filename stem in the description. The
//! filename is display text only, it is never opened.
use std::{fmt, thread, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::{now_iso, round_confidence};

pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_millis(600);

pub const UPLOAD_FALLBACK_LABEL: &str = "uploaded video";
pub const NO_SOURCE_DESCRIPTION: &str =
    "No video source provided. Use the upload or live stream controls.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub name: String,
    pub confidence: f64,
    pub warning_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub detected_objects: Vec<DetectedObject>,
    #[serde(rename = "audioDescription")]
    pub audio_description: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Upload { filename: Option<String> },
    Live { tick: i64 },
    None,
}

impl Source {
    /// Unknown kinds fall back to [`Source::None`].
    pub fn from_kind(kind: &str, filename: Option<String>, tick: i64) -> Self {
        match kind {
            "upload" => Source::Upload { filename },
            "live" => Source::Live { tick },
            _ => Source::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Upload { .. } => "upload",
            Source::Live { .. } => "live",
            Source::None => "none",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Sighting {
    name: &'static str,
    confidence: f64,
    warning_flag: bool,
}

impl Sighting {
    const fn new(name: &'static str, confidence: f64, warning_flag: bool) -> Self {
        Self {
            name,
            confidence,
            warning_flag,
        }
    }

    fn detect(&self) -> DetectedObject {
        DetectedObject {
            name: self.name.to_string(),
            confidence: round_confidence(self.confidence),
            warning_flag: self.warning_flag,
        }
    }
}

struct Scene {
    sightings: &'static [Sighting],
    description: &'static str,
}

const PERSON: Sighting = Sighting::new("person", 0.98, false);
const CHAIR: Sighting = Sighting::new("chair", 0.88, false);
const STAIRCASE: Sighting = Sighting::new("staircase", 0.79, true);

const LIVE_SCENES: [Scene; 5] = [
    Scene {
        sightings: &[PERSON, CHAIR, STAIRCASE],
        description: "Person ahead. Chair to the right. Stairs ahead, be careful.",
    },
    Scene {
        sightings: &[
            Sighting::new("door", 0.92, false),
            Sighting::new("curb", 0.75, true),
        ],
        description: "Door detected. Curb 3 feet ahead, watch your step.",
    },
    Scene {
        sightings: &[
            Sighting::new("exit sign", 0.86, false),
            Sighting::new("person", 0.95, false),
        ],
        description: "Sign says: Exit. Two people nearby.",
    },
    Scene {
        sightings: &[Sighting::new("vehicle", 0.90, true)],
        description: "Vehicle approaching from the left. Move back from the road.",
    },
    Scene {
        sightings: &[PERSON, CHAIR, STAIRCASE, Sighting::new("puddle", 0.70, true)],
        description: "Puddle detected. Slippery surface ahead.",
    },
];

const UPLOAD_SIGHTINGS: &[Sighting] = &[
    Sighting::new("text sign", 0.94, false),
    Sighting::new("person", 0.89, false),
];

pub fn scene_index(tick: i64) -> usize {
    tick.rem_euclid(LIVE_SCENES.len() as i64) as usize
}

/// Everything before the first `.`, e.g. `archive.tar.gz` -> `archive`.
pub fn upload_label(filename: Option<&str>) -> &str {
    let name = filename
        .filter(|name| !name.is_empty())
        .unwrap_or(UPLOAD_FALLBACK_LABEL);

    name.split('.').next().unwrap_or(name)
}

fn detect_all(sightings: &[Sighting]) -> Vec<DetectedObject> {
    sightings.iter().map(Sighting::detect).collect()
}

/// Picks the canned result for `source` without any delay.
pub fn select(source: &Source) -> AnalysisResult {
    let (detected_objects, audio_description) = match source {
        Source::Live { tick } => {
            let scene = &LIVE_SCENES[scene_index(*tick)];

            (detect_all(scene.sightings), scene.description.to_string())
        }
        Source::Upload { filename } => (
            detect_all(UPLOAD_SIGHTINGS),
            format!(
                "Analysis of {}: Sign reads 'Welcome'. Person detected nearby.",
                upload_label(filename.as_deref())
            ),
        ),
        Source::None => (Vec::new(), NO_SOURCE_DESCRIPTION.to_string()),
    };

    AnalysisResult {
        detected_objects,
        audio_description,
        timestamp: now_iso(),
    }
}

/// [`select`] behind a blocking, fixed processing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analyzer {
    delay: Duration,
}

impl Analyzer {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn analyze(&self, source: &Source) -> AnalysisResult {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let result = select(source);
        debug!(
            %source,
            objects = result.detected_objects.len(),
            "Simulated analysis complete"
        );

        result
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYSIS_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use super::*;

    fn names(result: &AnalysisResult) -> Vec<&str> {
        result
            .detected_objects
            .iter()
            .map(|object| object.name.as_str())
            .collect()
    }

    fn live(tick: i64) -> AnalysisResult {
        select(&Source::Live { tick })
    }

    fn upload(filename: Option<&str>) -> AnalysisResult {
        select(&Source::Upload {
            filename: filename.map(str::to_string),
        })
    }

    #[test]
    fn test_live_scene_zero() {
        let result = live(0);

        assert_eq!(names(&result), ["person", "chair", "staircase"]);
        assert_eq!(
            result.detected_objects[0],
            DetectedObject {
                name: "person".to_string(),
                confidence: 0.98,
                warning_flag: false,
            }
        );
        assert!(result.detected_objects[2].warning_flag);
        assert_eq!(
            result.audio_description,
            "Person ahead. Chair to the right. Stairs ahead, be careful."
        );
    }

    #[test]
    fn test_live_scenes_one_to_three() {
        let door = live(1);
        assert_eq!(names(&door), ["door", "curb"]);
        assert!(door.audio_description.contains("Curb 3 feet ahead"));
        assert!(!door.detected_objects[0].warning_flag);
        assert!(door.detected_objects[1].warning_flag);

        let exit = live(2);
        assert_eq!(names(&exit), ["exit sign", "person"]);
        assert_eq!(exit.audio_description, "Sign says: Exit. Two people nearby.");
        assert!(exit.detected_objects.iter().all(|object| !object.warning_flag));

        let vehicle = live(3);
        assert_eq!(names(&vehicle), ["vehicle"]);
        assert_eq!(vehicle.detected_objects[0].confidence, 0.9);
        assert!(vehicle.detected_objects[0].warning_flag);
        assert!(vehicle.audio_description.contains("Move back from the road"));
    }

    #[test]
    fn test_live_scene_four_extends_zero() {
        let base = live(0);
        let puddle = live(4);

        assert_eq!(puddle.detected_objects[..3], base.detected_objects[..]);
        assert_eq!(
            puddle.detected_objects[3],
            DetectedObject {
                name: "puddle".to_string(),
                confidence: 0.7,
                warning_flag: true,
            }
        );
        assert_eq!(
            puddle.audio_description,
            "Puddle detected. Slippery surface ahead."
        );
    }

    #[test]
    fn test_live_periodic() {
        for tick in -25..25 {
            let a = live(tick);
            let b = live(tick + 5);

            assert_eq!(a.detected_objects, b.detected_objects, "tick {tick}");
            assert_eq!(a.audio_description, b.audio_description, "tick {tick}");
        }
    }

    #[test]
    fn test_negative_ticks_wrap_forward() {
        assert_eq!(scene_index(-1), 4);
        assert_eq!(scene_index(-4), 1);
        assert_eq!(scene_index(-5), 0);
        assert_eq!(scene_index(-6), 4);
        assert_eq!(live(-1).audio_description, live(4).audio_description);
    }

    #[test]
    fn test_extreme_ticks() {
        assert_eq!(scene_index(i64::MAX), 2);
        assert_eq!(scene_index(i64::MIN), 2);
    }

    #[test]
    fn test_upload_labels() {
        assert_eq!(upload_label(Some("photo.jpg")), "photo");
        assert_eq!(upload_label(Some("archive.tar.gz")), "archive");
        assert_eq!(upload_label(Some("clip")), "clip");
        assert_eq!(upload_label(None), "uploaded video");
        assert_eq!(upload_label(Some("")), "uploaded video");
    }

    #[test]
    fn test_upload_result() {
        let result = upload(Some("street_walk.mp4"));

        assert_eq!(names(&result), ["text sign", "person"]);
        assert!(result.detected_objects.iter().all(|object| !object.warning_flag));
        assert_eq!(
            result.audio_description,
            "Analysis of street_walk: Sign reads 'Welcome'. Person detected nearby."
        );

        assert_eq!(
            upload(None).audio_description,
            "Analysis of uploaded video: Sign reads 'Welcome'. Person detected nearby."
        );
    }

    #[test]
    fn test_no_source() {
        for source in [
            Source::None,
            Source::from_kind("none", None, 0),
            Source::from_kind("anything-unrecognized", Some("a.mp4".to_string()), 3),
            Source::from_kind("", None, 0),
        ] {
            let result = select(&source);

            assert!(result.detected_objects.is_empty());
            assert_eq!(result.audio_description, NO_SOURCE_DESCRIPTION);
        }
    }

    #[test]
    fn test_from_kind() {
        assert_eq!(Source::from_kind("live", None, 7), Source::Live { tick: 7 });
        assert_eq!(
            Source::from_kind("upload", Some("a.mov".to_string()), 7),
            Source::Upload {
                filename: Some("a.mov".to_string())
            }
        );
        assert_eq!(Source::from_kind("LIVE", None, 7), Source::None);
    }

    #[test]
    fn test_source_names() {
        assert_eq!(Source::Live { tick: 0 }.to_string(), "live");
        assert_eq!(Source::Upload { filename: None }.to_string(), "upload");
        assert_eq!(Source::None.to_string(), "none");
    }

    #[test]
    fn test_confidences_rounded_and_bounded() {
        let mut results: Vec<AnalysisResult> = (0..5).map(live).collect();
        results.push(upload(Some("x.mp4")));

        for object in results.iter().flat_map(|result| &result.detected_objects) {
            assert!((0.0..=1.0).contains(&object.confidence), "{}", object.name);
            assert_eq!(round_confidence(object.confidence), object.confidence);
            assert_eq!(
                format!("{:.2}", object.confidence).parse::<f64>().ok(),
                Some(object.confidence)
            );
        }
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(live(1)).unwrap();

        assert_eq!(
            value["audioDescription"],
            "Door detected. Curb 3 feet ahead, watch your step."
        );
        assert_eq!(value["detected_objects"][1]["name"], "curb");
        assert_eq!(value["detected_objects"][1]["confidence"], 0.75);
        assert_eq!(value["detected_objects"][1]["warning_flag"], true);
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(value.get("audio_description").is_none());
    }

    #[test]
    fn test_analyzer_without_delay() {
        let analyzer = Analyzer::new(Duration::ZERO);
        let source = Source::Live { tick: 2 };

        let start = Instant::now();
        let result = analyzer.analyze(&source);

        assert!(start.elapsed() < DEFAULT_ANALYSIS_DELAY);
        assert_eq!(result.detected_objects, select(&source).detected_objects);
    }

    #[test]
    fn test_analyzer_waits() {
        let delay = Duration::from_millis(30);
        let analyzer = Analyzer::new(delay);

        let start = Instant::now();
        analyzer.analyze(&Source::None);

        assert!(start.elapsed() >= delay);
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(Analyzer::default().delay(), Duration::from_millis(600));
    }

    #[test]
    fn test_concurrent_selection() {
        let analyzer = Analyzer::new(Duration::ZERO);

        let handles: Vec<_> = (-40..40)
            .map(|tick| {
                thread::spawn(move || {
                    let result = analyzer.analyze(&Source::Live { tick });
                    (tick, result)
                })
            })
            .collect();

        for handle in handles {
            let (tick, result) = handle.join().unwrap();
            let expected = select(&Source::Live { tick });

            assert_eq!(result.detected_objects, expected.detected_objects);
            assert_eq!(result.audio_description, expected.audio_description);
        }
    }
}
