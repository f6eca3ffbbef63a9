// ABOUTME: Detection and repair of lossy-decoding corruption (U+FFFD) in video records.
// ABOUTME: Merges an original and a re-fetched batch field by field, keeping the cleaner copy.

use crate::models::VideoRecord;

/// Replacement character produced when upstream text was decoded lossily.
pub const CORRUPTION_MARKER: char = '\u{FFFD}';

/// Text fields checked for corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    PublishedAt,
    AvailableAt,
    ChannelId,
    ChannelName,
    ChannelEnglishName,
}

impl Field {
    const ALL: [Field; 7] = [
        Field::Id,
        Field::Title,
        Field::PublishedAt,
        Field::AvailableAt,
        Field::ChannelId,
        Field::ChannelName,
        Field::ChannelEnglishName,
    ];

    fn get(self, video: &VideoRecord) -> Option<&str> {
        match self {
            Field::Id => Some(&video.id),
            Field::Title => Some(&video.title),
            Field::PublishedAt => video.published_at.as_deref(),
            Field::AvailableAt => Some(&video.available_at),
            Field::ChannelId => Some(&video.channel.id),
            Field::ChannelName => Some(&video.channel.name),
            Field::ChannelEnglishName => video.channel.english_name.as_deref(),
        }
    }

    fn set(self, video: &mut VideoRecord, value: String) {
        match self {
            Field::Id => video.id = value,
            Field::Title => video.title = value,
            Field::PublishedAt => video.published_at = Some(value),
            Field::AvailableAt => video.available_at = value,
            Field::ChannelId => video.channel.id = value,
            Field::ChannelName => video.channel.name = value,
            Field::ChannelEnglishName => video.channel.english_name = Some(value),
        }
    }
}

/// Number of corruption markers in `s`.
pub fn count_markers(s: &str) -> usize {
    s.chars().filter(|&c| c == CORRUPTION_MARKER).count()
}

/// Removes every corruption marker from `s`.
pub fn strip_markers(s: &str) -> String {
    s.chars().filter(|&c| c != CORRUPTION_MARKER).collect()
}

/// Total corruption markers across the checked fields of a record.
pub fn marker_count(video: &VideoRecord) -> usize {
    Field::ALL
        .iter()
        .filter_map(|f| f.get(video))
        .map(count_markers)
        .sum()
}

pub fn is_corrupted(video: &VideoRecord) -> bool {
    marker_count(video) > 0
}

/// Number of records in the batch carrying at least one marker.
pub fn corrupted_count(batch: &[VideoRecord]) -> usize {
    batch.iter().filter(|v| is_corrupted(v)).count()
}

/// Picks whichever candidate has fewer markers; ties keep `original`.
pub fn choose_cleaner<'a>(original: &'a str, retried: &'a str) -> &'a str {
    if count_markers(retried) < count_markers(original) {
        retried
    } else {
        original
    }
}

/// Strips remaining markers from every checked field of a record.
pub fn strip(video: &mut VideoRecord) {
    for field in Field::ALL {
        let cleaned = match field.get(video) {
            Some(value) if count_markers(value) > 0 => strip_markers(value),
            _ => continue,
        };
        field.set(video, cleaned);
    }
}

/// Strips markers from every record of a batch.
pub fn strip_batch(mut batch: Vec<VideoRecord>) -> Vec<VideoRecord> {
    batch.iter_mut().for_each(strip);
    batch
}

/// Merges `retried` into `original` positionally, field by field, then strips.
///
/// For each field the copy with fewer markers wins, so the result never has
/// more markers than the better candidate and has none after stripping.
/// Records without a positional counterpart in `retried` are only stripped.
pub fn repair(original: Vec<VideoRecord>, retried: &[VideoRecord]) -> Vec<VideoRecord> {
    original
        .into_iter()
        .enumerate()
        .map(|(idx, mut video)| {
            if let Some(other) = retried.get(idx) {
                merge_fields(&mut video, other);
            }
            strip(&mut video);
            video
        })
        .collect()
}

fn merge_fields(video: &mut VideoRecord, other: &VideoRecord) {
    for field in Field::ALL {
        let replacement = match (field.get(video), field.get(other)) {
            (Some(mine), Some(theirs)) => {
                let chosen = choose_cleaner(mine, theirs);
                if chosen == mine {
                    continue;
                }
                chosen.to_owned()
            }
            _ => continue,
        };
        field.set(video, replacement);
    }
}
