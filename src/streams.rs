//! Video metadata and stream selection
//!
//! The extraction tool reports every available stream of a video page as a
//! JSON format list. This module deserializes the subset the worker needs
//! and maps the user's quality tier onto one concrete stream.

use serde::Deserialize;

use crate::data_structures::Quality;

/// One downloadable format as reported by the extraction tool's JSON dump
#[derive(Debug, Clone, Deserialize)]
pub struct StreamFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub filesize: Option<u64>,
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

impl StreamFormat {
    pub fn has_video(&self) -> bool {
        codec_present(self.vcodec.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    /// A progressive stream bundles audio and video in a single file
    pub fn is_progressive(&self) -> bool {
        self.has_video() && self.has_audio()
    }
}

/// Subset of the tool's metadata dump the worker cares about
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

impl VideoMetadata {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Map the selected quality tier onto one of the available streams.
///
/// All tiers select among progressive streams: Low takes the lowest
/// resolution, High the highest, and Medium the first one the tool lists.
/// Streams without a known height sort below every measured one.
pub fn select_stream(quality: Quality, formats: &[StreamFormat]) -> Option<&StreamFormat> {
    let mut progressive = formats.iter().filter(|f| f.is_progressive());
    match quality {
        Quality::Low => progressive.min_by_key(|f| f.height.unwrap_or(u32::MAX)),
        Quality::High => progressive.max_by_key(|f| f.height.unwrap_or(0)),
        Quality::Medium => progressive.next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(id: &str, vcodec: Option<&str>, acodec: Option<&str>, height: Option<u32>) -> StreamFormat {
        StreamFormat {
            format_id: id.to_string(),
            ext: Some("mp4".to_string()),
            vcodec: vcodec.map(String::from),
            acodec: acodec.map(String::from),
            height,
            filesize: None,
        }
    }

    fn sample_formats() -> Vec<StreamFormat> {
        vec![
            format("audio", None, Some("opus"), None),
            format("prog-360", Some("avc1"), Some("mp4a"), Some(360)),
            format("video-1080", Some("vp9"), Some("none"), Some(1080)),
            format("prog-720", Some("avc1"), Some("mp4a"), Some(720)),
            format("prog-144", Some("avc1"), Some("mp4a"), Some(144)),
        ]
    }

    #[test]
    fn progressive_requires_both_codecs() {
        let formats = sample_formats();
        assert!(!formats[0].is_progressive());
        assert!(formats[1].is_progressive());
        assert!(!formats[2].is_progressive());
    }

    #[test]
    fn low_selects_lowest_resolution_progressive() {
        let formats = sample_formats();
        let selected = select_stream(Quality::Low, &formats).unwrap();
        assert_eq!(selected.format_id, "prog-144");
    }

    #[test]
    fn high_selects_highest_resolution_progressive() {
        let formats = sample_formats();
        let selected = select_stream(Quality::High, &formats).unwrap();
        // The 1080p stream is video-only and must not win
        assert_eq!(selected.format_id, "prog-720");
    }

    #[test]
    fn medium_selects_first_progressive() {
        let formats = sample_formats();
        let selected = select_stream(Quality::Medium, &formats).unwrap();
        assert_eq!(selected.format_id, "prog-360");
    }

    #[test]
    fn no_progressive_stream_selects_nothing() {
        let formats = vec![
            format("audio", None, Some("opus"), None),
            format("video", Some("vp9"), Some("none"), Some(1080)),
        ];
        for quality in [Quality::Low, Quality::Medium, Quality::High] {
            assert!(select_stream(quality, &formats).is_none());
        }
    }

    #[test]
    fn metadata_parses_tool_json() {
        let json = r#"{
            "id": "abc123",
            "title": "Some Clip",
            "formats": [
                {"format_id": "18", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a", "height": 360},
                {"format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus"}
            ]
        }"#;
        let metadata = VideoMetadata::parse(json).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Some Clip"));
        assert_eq!(metadata.formats.len(), 2);
        assert!(metadata.formats[0].is_progressive());
        assert!(!metadata.formats[1].is_progressive());
        assert_eq!(metadata.formats[1].height, None);
    }
}
