//! MCP Tool Definitions
//!
//! Six index tools plus ten read-only YouTube lookups and statistics.

use super::protocol::{PropertySchema, Tool, ToolInputSchema};
use std::collections::HashMap;

/// Get all available tools
pub fn get_all_tools() -> Vec<Tool> {
    vec![
        // Index tools (6)
        index_video_tool(),
        semantic_search_tool(),
        fetch_and_index_transcript_tool(),
        bulk_index_channel_videos_tool(),
        check_transcript_availability_tool(),
        find_videos_with_transcripts_tool(),
        // Lookup tools (5)
        get_video_transcript_tool(),
        search_youtube_tool(),
        get_latest_videos_from_channel_tool(),
        get_video_details_tool(),
        get_video_comments_tool(),
        // Statistics tools (5)
        get_video_stats_tool(),
        compare_video_stats_tool(),
        search_and_analyze_videos_tool(),
        get_channel_stats_tool(),
        get_channel_id_by_username_tool(),
    ]
}

fn prop(property_type: &str, description: &str) -> PropertySchema {
    PropertySchema {
        property_type: property_type.to_string(),
        description: Some(description.to_string()),
        default: None,
        items: None,
        minimum: None,
        maximum: None,
    }
}

fn string_prop(description: &str) -> PropertySchema {
    prop("string", description)
}

fn integer_prop(description: &str, default: u64, maximum: Option<u64>) -> PropertySchema {
    PropertySchema {
        default: Some(serde_json::json!(default)),
        minimum: Some(0.0),
        maximum: maximum.map(|m| m as f64),
        ..prop("integer", description)
    }
}

fn boolean_prop(description: &str, default: bool) -> PropertySchema {
    PropertySchema {
        default: Some(serde_json::json!(default)),
        ..prop("boolean", description)
    }
}

fn string_array_prop(description: &str) -> PropertySchema {
    PropertySchema {
        items: Some(Box::new(PropertySchema {
            description: None,
            ..prop("string", "")
        })),
        ..prop("array", description)
    }
}

fn tool(
    name: &str,
    description: &str,
    properties: Vec<(&str, PropertySchema)>,
    required: &[&str],
) -> Tool {
    let properties: HashMap<String, PropertySchema> = properties
        .into_iter()
        .map(|(key, schema)| (key.to_string(), schema))
        .collect();

    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: (!required.is_empty())
                .then(|| required.iter().map(|r| r.to_string()).collect()),
        },
    }
}

fn video_id_prop() -> PropertySchema {
    string_prop("YouTube video id (11 characters, e.g. dQw4w9WgXcQ)")
}

fn languages_prop() -> PropertySchema {
    string_array_prop(
        "Caption language codes in preference order (e.g. [\"de\", \"en\"]). When given, only these languages are accepted.",
    )
}

// === Index Tools ===

fn index_video_tool() -> Tool {
    tool(
        "index_video",
        "Adds a transcript you already have to the semantic index. USE WHEN: the text did not come from YouTube captions.",
        vec![
            ("title", string_prop("Title stored with the transcript")),
            ("transcript", string_prop("Full transcript text to embed")),
            ("video_id", video_id_prop()),
        ],
        &["title", "transcript"],
    )
}

fn semantic_search_tool() -> Tool {
    tool(
        "semantic_search",
        "Searches indexed transcripts by meaning, nearest first. similarity_score is 100 / (1 + distance): 100 for an exact match, falling towards 0.",
        vec![
            ("query", string_prop("Natural-language query")),
            ("top_k", integer_prop("Maximum number of results", 3, None)),
            (
                "include_full_text",
                boolean_prop("Attach the full stored transcript to each result", false),
            ),
        ],
        &["query"],
    )
}

fn fetch_and_index_transcript_tool() -> Tool {
    tool(
        "fetch_and_index_transcript",
        "Fetches a video's metadata and best caption track, then indexes the transcript. Without languages: manual English, then auto-generated English, then any track.",
        vec![("video_id", video_id_prop()), ("languages", languages_prop())],
        &["video_id"],
    )
}

fn bulk_index_channel_videos_tool() -> Tool {
    tool(
        "bulk_index_channel_videos",
        "Indexes the latest videos of a channel one by one. Videos without captions or failing to index are reported per item and never stop the batch.",
        vec![
            (
                "channel_id",
                string_prop("Channel id (defaults to the configured channel)"),
            ),
            (
                "max_videos",
                integer_prop("Maximum number of videos to attempt", 10, Some(50)),
            ),
            (
                "video_ids",
                string_array_prop("Explicit video ids to index instead of a channel listing"),
            ),
        ],
        &[],
    )
}

fn check_transcript_availability_tool() -> Tool {
    tool(
        "check_transcript_availability",
        "Lists a video's caption tracks without fetching or indexing anything.",
        vec![("video_id", video_id_prop())],
        &["video_id"],
    )
}

fn find_videos_with_transcripts_tool() -> Tool {
    tool(
        "find_videos_with_transcripts",
        "Searches by query (or lists a channel) and keeps only videos that have caption tracks.",
        vec![
            ("query", string_prop("Search query; takes precedence over channel_id")),
            (
                "channel_id",
                string_prop("Channel id (defaults to the configured channel)"),
            ),
            (
                "max_results",
                integer_prop("Maximum number of videos to check", 20, Some(50)),
            ),
        ],
        &[],
    )
}

// === Lookup Tools ===

fn get_video_transcript_tool() -> Tool {
    tool(
        "get_video_transcript",
        "Returns the transcript of a video without indexing it.",
        vec![("video_id", video_id_prop()), ("languages", languages_prop())],
        &["video_id"],
    )
}

fn search_youtube_tool() -> Tool {
    tool(
        "search_youtube",
        "Searches YouTube for videos by keyword, ordered by relevance.",
        vec![
            ("query", string_prop("Search keywords")),
            (
                "max_results",
                integer_prop("Maximum number of videos", 5, Some(50)),
            ),
        ],
        &["query"],
    )
}

fn get_latest_videos_from_channel_tool() -> Tool {
    tool(
        "get_latest_videos_from_channel",
        "Lists a channel's most recent uploads, newest first.",
        vec![
            (
                "channel_id",
                string_prop("Channel id (defaults to the configured channel)"),
            ),
            (
                "max_results",
                integer_prop("Maximum number of videos", 5, Some(50)),
            ),
        ],
        &[],
    )
}

fn get_video_details_tool() -> Tool {
    tool(
        "get_video_details",
        "Returns title, description, channel, publish date and statistics of a video.",
        vec![("video_id", video_id_prop())],
        &["video_id"],
    )
}

fn get_video_comments_tool() -> Tool {
    tool(
        "get_video_comments",
        "Returns the top-level comments of a video, most relevant first.",
        vec![
            ("video_id", video_id_prop()),
            (
                "max_results",
                integer_prop("Maximum number of comments", 50, Some(100)),
            ),
        ],
        &["video_id"],
    )
}

fn get_video_stats_tool() -> Tool {
    tool(
        "get_video_stats",
        "Returns view, like and comment counts of a video.",
        vec![("video_id", video_id_prop())],
        &["video_id"],
    )
}

fn compare_video_stats_tool() -> Tool {
    tool(
        "compare_video_stats",
        "Compares the statistics of several videos. A video that cannot be looked up keeps its row with an error.",
        vec![("video_ids", string_array_prop("YouTube video ids to compare"))],
        &["video_ids"],
    )
}

fn search_and_analyze_videos_tool() -> Tool {
    tool(
        "search_and_analyze_videos",
        "Searches YouTube and reports the most viewed, most liked and most commented results.",
        vec![
            ("query", string_prop("Search keywords")),
            (
                "max_results",
                integer_prop("Maximum number of videos to analyze", 10, Some(50)),
            ),
        ],
        &["query"],
    )
}

fn get_channel_stats_tool() -> Tool {
    tool(
        "get_channel_stats",
        "Returns subscriber, view and video counts of a channel.",
        vec![(
            "channel_id",
            string_prop("Channel id (defaults to the configured channel)"),
        )],
        &[],
    )
}

fn get_channel_id_by_username_tool() -> Tool {
    tool(
        "get_channel_id_by_username",
        "Finds the channel id that best matches a channel name or handle.",
        vec![("username", string_prop("Channel name or handle"))],
        &["username"],
    )
}
