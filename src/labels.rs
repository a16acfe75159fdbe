use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::Path;

use thiserror::Error;

/// Line 0 of a plain SSD MobileNet label map is the background class; the
/// model's class ids start counting after it.
const BACKGROUND_OFFSET: i32 = 1;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("label map is empty")]
    Empty,
}

/// Maps decoded class ids to display names.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    labels: HashMap<i32, String>,
}

impl LabelMap {
    /// Accepts either `<id> <name>` lines (ids used as-is) or one name per
    /// line with the background class first.
    pub fn parse(text: &str) -> Result<Self, LabelError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(LabelError::Empty);
        }

        let explicit: Option<HashMap<i32, String>> = lines.iter().map(|line| parse_numbered(line)).collect();
        let labels = match explicit {
            Some(labels) => labels,
            None => lines
                .iter()
                .enumerate()
                .map(|(line_no, name)| (line_no as i32 - BACKGROUND_OFFSET, name.to_string()))
                .filter(|(id, _)| *id >= 0)
                .collect(),
        };
        Ok(Self { labels })
    }

    pub fn from_file(path: &Path) -> Result<Self, LabelError> {
        let text = read_to_string(path).map_err(|source| LabelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn lookup(&self, label: i32) -> Option<&str> {
        self.labels.get(&label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn parse_numbered(line: &str) -> Option<(i32, String)> {
    let (id, name) = line.split_once(char::is_whitespace)?;
    let id = id.parse::<i32>().ok()?;
    let name = name.trim();
    (!name.is_empty()).then(|| (id, name.to_string()))
}
