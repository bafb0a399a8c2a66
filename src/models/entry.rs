use super::{Blog, EntityKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post within a blog. `content` is a text blob and is usually staged with
/// `set_blob` before the entry is saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog: Option<Blog>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

impl EntityKind for Entry {
    const NAME: &'static str = "entry";
    const COLLECTION: &'static str = "entries";
}

impl Entry {
    pub fn summary(&self) -> String {
        let id = self.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        let mut line = format!("#{} {}", id, self.title);
        if let Some(date) = self.date {
            line.push_str(&format!(" [{}]", date.format("%Y-%m-%d %H:%M")));
        }
        if let Some(ref blog) = self.blog {
            line.push_str(&format!(" in {}", blog.handle));
        }
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(|t| t.name.as_str()).collect();
            line.push_str(&format!(" {{{}}}", tags.join(", ")));
        }
        line
    }
}
