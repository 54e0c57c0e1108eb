/// Knowledge point registry built from a processing response
use super::{KnowledgePoint, Language, TimingEntry};
use crate::api::models::{ProcessVideoResponse, RawKnowledgePoint, RawTimingEntry};
use crate::timestamp::{format_timestamp, parse_timestamp};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Where the title index was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    TimestampMapping,
    KnowledgePoints,
    ContentSegments,
    Empty,
}

/// Ordered knowledge points plus a title lookup, immutable once built
#[derive(Debug, Clone)]
pub struct KnowledgeRegistry {
    points: Vec<KnowledgePoint>,
    title_index: HashMap<String, TimingEntry>,
    index_source: IndexSource,
}

impl KnowledgeRegistry {
    /// An empty registry, before any video was processed
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            title_index: HashMap::new(),
            index_source: IndexSource::Empty,
        }
    }

    /// Build the registry from one processing response
    pub fn build(response: &ProcessVideoResponse, language: Language) -> Self {
        let analysis = response.analysis.as_ref();
        let segments: &[RawKnowledgePoint] = analysis.map(|a| a.content_segments.as_slice()).unwrap_or(&[]);
        let legacy_points: &[RawKnowledgePoint] = analysis.map(|a| a.knowledge_points.as_slice()).unwrap_or(&[]);

        let raw_points = [response.knowledge_points.as_slice(), segments, legacy_points]
            .into_iter()
            .find(|list| !list.is_empty());

        let points: Vec<KnowledgePoint> = match raw_points {
            Some(list) => list.iter().map(|raw| normalize_point(raw, language)).collect(),
            None => points_from_mapping(&response.timestamp_mapping, language),
        };

        let (title_index, index_source) = if !response.timestamp_mapping.is_empty() {
            let index = response
                .timestamp_mapping
                .iter()
                .map(|(title, entry)| (title.clone(), normalize_timing(entry)))
                .collect();
            (index, IndexSource::TimestampMapping)
        } else if !response.knowledge_points.is_empty() {
            (index_from_raw(&response.knowledge_points), IndexSource::KnowledgePoints)
        } else if !segments.is_empty() {
            (index_from_raw(segments), IndexSource::ContentSegments)
        } else {
            (HashMap::new(), IndexSource::Empty)
        };

        if points.is_empty() {
            warn!("⚠️ Processing response contained no knowledge points");
        } else {
            info!(
                "📚 Registry built with {} knowledge points ({} titles indexed from {:?})",
                points.len(),
                title_index.len(),
                index_source
            );
        }

        Self {
            points,
            title_index,
            index_source,
        }
    }

    pub fn points(&self) -> &[KnowledgePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&KnowledgePoint> {
        self.points.get(index)
    }

    /// Timing for a title used by inline references
    pub fn lookup(&self, title: &str) -> Option<&TimingEntry> {
        self.title_index.get(title)
    }

    /// Position of the first point carrying `title`
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.points.iter().position(|p| p.title == title)
    }

    pub fn index_source(&self) -> IndexSource {
        self.index_source
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `HH:MM:SS - title` lines, one per point
    pub fn timestamp_lines(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{} - {}", p.start_time_text, p.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for KnowledgeRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Whole, non-negative seconds from a loosely typed JSON number
fn whole_seconds(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.min(u32::MAX as f64) as u32)
}

/// Resolve seconds from the numeric field, falling back to the text when the
/// number is missing or zero
fn resolve_seconds(seconds: Option<f64>, text: Option<&str>) -> Option<u32> {
    match (whole_seconds(seconds), text.and_then(parse_timestamp)) {
        (Some(s), _) if s > 0 => Some(s),
        (_, Some(parsed)) => Some(parsed),
        (numeric, None) => numeric,
    }
}

fn normalize_point(raw: &RawKnowledgePoint, language: Language) -> KnowledgePoint {
    let title = raw
        .resolved_title()
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| language.unknown_segment().to_string());

    let start_seconds = resolve_seconds(raw.start_seconds, raw.start_text()).unwrap_or(0);
    let end_seconds = resolve_seconds(raw.end_seconds, raw.end_text())
        .unwrap_or(start_seconds)
        .max(start_seconds);

    if raw.start_seconds.is_none() && raw.start_text().is_none() {
        debug!("Knowledge point '{}' has no start time, using 0", title);
    }

    KnowledgePoint {
        start_time_text: format_timestamp(start_seconds),
        end_time_text: format_timestamp(end_seconds),
        description: raw.description.clone().unwrap_or_default(),
        key_phrase: raw.key_phrase.clone().filter(|k| !k.is_empty()),
        category: non_empty(&raw.category).unwrap_or(language.default_category()).to_string(),
        importance: non_empty(&raw.importance).unwrap_or("medium").to_string(),
        difficulty: non_empty(&raw.difficulty).unwrap_or(language.default_difficulty()).to_string(),
        title,
        start_seconds,
        end_seconds,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn normalize_timing(entry: &RawTimingEntry) -> TimingEntry {
    let start_seconds = resolve_seconds(entry.start_seconds, entry.start_time.as_deref()).unwrap_or(0);
    let end_seconds = resolve_seconds(entry.end_seconds, entry.end_time.as_deref())
        .unwrap_or(start_seconds)
        .max(start_seconds);

    TimingEntry {
        start_time: format_timestamp(start_seconds),
        end_time: format_timestamp(end_seconds),
        start_seconds,
        end_seconds,
        description: entry.description.clone().unwrap_or_default(),
    }
}

/// Index built from a points array; untitled points are not indexed
fn index_from_raw(raw_points: &[RawKnowledgePoint]) -> HashMap<String, TimingEntry> {
    let mut index = HashMap::new();
    for raw in raw_points {
        let Some(title) = raw.resolved_title() else {
            continue;
        };
        let point = normalize_point(raw, Language::English);
        index.insert(
            title.trim().to_string(),
            TimingEntry {
                start_time: point.start_time_text,
                end_time: point.end_time_text,
                start_seconds: point.start_seconds,
                end_seconds: point.end_seconds,
                description: point.description,
            },
        );
    }
    index
}

/// Points derived from the explicit mapping, ordered by start time
fn points_from_mapping(
    mapping: &std::collections::BTreeMap<String, RawTimingEntry>,
    language: Language,
) -> Vec<KnowledgePoint> {
    let mut points: Vec<KnowledgePoint> = mapping
        .iter()
        .map(|(title, entry)| {
            let timing = normalize_timing(entry);
            KnowledgePoint {
                title: title.clone(),
                start_seconds: timing.start_seconds,
                end_seconds: timing.end_seconds,
                start_time_text: timing.start_time,
                end_time_text: timing.end_time,
                description: timing.description,
                key_phrase: None,
                category: language.default_category().to_string(),
                importance: "medium".to_string(),
                difficulty: language.default_difficulty().to_string(),
            }
        })
        .collect();

    points.sort_by_key(|p| p.start_seconds);
    points
}
