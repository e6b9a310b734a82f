//! Transcript segments and source-video references

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A timestamped span of transcribed text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub text: String,
    /// Display timestamp, e.g. "01:05" or "1:02:03"
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Format a second offset as `MM:SS`, or `H:MM:SS` past the hour
pub fn format_timestamp(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Join segment texts into one transcript string
pub fn full_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// YouTube video ids are 11 characters of `[A-Za-z0-9_-]`
const VIDEO_ID_LEN: usize = 11;

/// A source video to transcribe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoReference {
    pub video_id: String,
}

impl VideoReference {
    /// Parse a watch URL, short link, embed/shorts URL or bare video id
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if is_video_id(input) {
            return Some(Self {
                video_id: input.to_string(),
            });
        }

        let url = Url::parse(input).ok()?;
        let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

        let candidate = match host {
            "youtu.be" => url.path_segments()?.next().map(str::to_string),
            "youtube.com" | "youtube-nocookie.com" => {
                let mut segments = url.path_segments()?;
                match segments.next() {
                    Some("watch") => url
                        .query_pairs()
                        .find(|(k, _)| k == "v")
                        .map(|(_, v)| v.into_owned()),
                    Some("embed") | Some("shorts") | Some("live") => {
                        segments.next().map(str::to_string)
                    }
                    _ => None,
                }
            }
            _ => None,
        }?;

        is_video_id(&candidate).then_some(Self {
            video_id: candidate,
        })
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.video_id)
    }
}

fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(5), "00:05");
        assert_eq!(format_timestamp(65), "01:05");
        assert_eq!(format_timestamp(3723), "1:02:03");
    }

    #[test]
    fn test_parse_video_reference_variants() {
        let expected = Some(VideoReference {
            video_id: "dQw4w9WgXcQ".to_string(),
        });
        assert_eq!(VideoReference::parse("dQw4w9WgXcQ"), expected);
        assert_eq!(
            VideoReference::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            expected
        );
        assert_eq!(VideoReference::parse("https://youtu.be/dQw4w9WgXcQ"), expected);
        assert_eq!(
            VideoReference::parse("https://youtube.com/embed/dQw4w9WgXcQ"),
            expected
        );
        assert_eq!(
            VideoReference::parse("https://m.youtube.com/shorts/dQw4w9WgXcQ"),
            expected
        );
    }

    #[test]
    fn test_parse_video_reference_rejects_garbage() {
        assert!(VideoReference::parse("").is_none());
        assert!(VideoReference::parse("not a video").is_none());
        assert!(VideoReference::parse("https://vimeo.com/12345678901").is_none());
        assert!(VideoReference::parse("https://www.youtube.com/watch?v=short").is_none());
    }

    #[test]
    fn test_segment_deserializes_camel_case() {
        let json = r#"{"id":"s1","text":"hello","startTime":"00:05"}"#;
        let segment: Segment = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(segment.start_time, "00:05");
        assert!(segment.end_time.is_none());
    }

    #[test]
    fn test_full_text() {
        let segments = vec![
            Segment {
                id: "a".into(),
                text: "Hello".into(),
                start_time: "00:00".into(),
                end_time: None,
            },
            Segment {
                id: "b".into(),
                text: "world".into(),
                start_time: "00:02".into(),
                end_time: None,
            },
        ];
        assert_eq!(full_text(&segments), "Hello world");
    }
}
