//! Post form validation and the visibility rule

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::bounded;
use super::ValidationError;

/// Maximum length for post titles
const MAX_TITLE_LEN: usize = 256;

/// Accepted `pub_date` layouts besides RFC 3339. Naive values are UTC.
const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Raw post form as submitted by the browser.
///
/// `is_published` is a checkbox: present (any value) means checked.
/// `category`/`location` are select boxes where the empty option is `""`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pub_date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<String>,
}

/// Validated post fields, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: i64,
    pub location_id: Option<i64>,
    pub is_published: bool,
}

impl PostDraft {
    pub fn new(form: &PostForm) -> Result<Self, ValidationError> {
        let title = bounded(&form.title, "title", MAX_TITLE_LEN)?;

        if form.text.trim().is_empty() {
            return Err(ValidationError::Empty { field: "text" });
        }

        let pub_date = parse_pub_date(&form.pub_date)?;

        let category_id = parse_id(&form.category, "category")?
            .ok_or(ValidationError::Empty { field: "category" })?;
        let location_id = parse_id(&form.location, "location")?;

        Ok(Self {
            title,
            text: form.text.clone(),
            pub_date,
            category_id,
            location_id,
            is_published: form.is_published.is_some(),
        })
    }
}

/// Parse the publication date from RFC 3339 or a `datetime-local` value.
pub fn parse_pub_date(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Empty { field: "pub_date" });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or(ValidationError::InvalidFormat {
            field: "pub_date",
            reason: "expected YYYY-MM-DDTHH:MM or an RFC 3339 timestamp",
        })
}

fn parse_id(raw: &str, field: &'static str) -> Result<Option<i64>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(Some)
        .ok_or(ValidationError::InvalidFormat {
            field,
            reason: "expected a numeric id",
        })
}

/// The facts that decide whether a post is public
#[derive(Debug, Clone, Copy)]
pub struct Visibility {
    pub is_published: bool,
    /// `None` when the post has no category
    pub category_published: Option<bool>,
    pub pub_date: DateTime<Utc>,
}

impl Visibility {
    /// A post is public once published, filed under a published category,
    /// and its publication date has arrived.
    pub fn is_public_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.category_published == Some(true) && self.pub_date <= now
    }

    /// Authors always see their own posts.
    pub fn visible_to(&self, author_id: i64, viewer_id: Option<i64>, now: DateTime<Utc>) -> bool {
        viewer_id == Some(author_id) || self.is_public_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn form() -> PostForm {
        PostForm {
            title: "  First day  ".into(),
            text: "It was a bright cold day in April.".into(),
            pub_date: "2024-04-04T13:00".into(),
            category: "3".into(),
            location: "".into(),
            is_published: Some("on".into()),
        }
    }

    #[test]
    fn valid_form() {
        let draft = PostDraft::new(&form()).unwrap();
        assert_eq!(draft.title, "First day");
        assert_eq!(draft.category_id, 3);
        assert_eq!(draft.location_id, None);
        assert!(draft.is_published);
        assert_eq!(
            draft.pub_date,
            Utc.with_ymd_and_hms(2024, 4, 4, 13, 0, 0).unwrap()
        );
    }

    #[test]
    fn unchecked_checkbox_means_unpublished() {
        let mut f = form();
        f.is_published = None;
        assert!(!PostDraft::new(&f).unwrap().is_published);
    }

    #[test]
    fn category_is_required() {
        let mut f = form();
        f.category = "".into();
        assert_eq!(
            PostDraft::new(&f).unwrap_err(),
            ValidationError::Empty { field: "category" }
        );
    }

    #[test]
    fn rejects_garbage_ids() {
        let mut f = form();
        f.location = "abc".into();
        assert!(matches!(
            PostDraft::new(&f).unwrap_err(),
            ValidationError::InvalidFormat { field: "location", .. }
        ));
    }

    #[test]
    fn rejects_empty_text() {
        let mut f = form();
        f.text = " \n ".into();
        assert_eq!(
            PostDraft::new(&f).unwrap_err(),
            ValidationError::Empty { field: "text" }
        );
    }

    #[test]
    fn pub_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap();
        assert_eq!(parse_pub_date("2024-01-02T03:04").unwrap(), expected);
        assert_eq!(parse_pub_date("2024-01-02 03:04:00").unwrap(), expected);
        assert_eq!(parse_pub_date("2024-01-02T06:04:00+03:00").unwrap(), expected);
        assert!(parse_pub_date("02.01.2024").is_err());
        assert!(matches!(
            parse_pub_date("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn visibility_rules() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let public = Visibility {
            is_published: true,
            category_published: Some(true),
            pub_date: now - Duration::hours(1),
        };
        assert!(public.is_public_at(now));

        let unpublished = Visibility {
            is_published: false,
            ..public
        };
        let hidden_category = Visibility {
            category_published: Some(false),
            ..public
        };
        let no_category = Visibility {
            category_published: None,
            ..public
        };
        let scheduled = Visibility {
            pub_date: now + Duration::hours(1),
            ..public
        };

        for v in [unpublished, hidden_category, no_category, scheduled] {
            assert!(!v.is_public_at(now));
            assert!(!v.visible_to(1, None, now));
            assert!(!v.visible_to(1, Some(2), now));
            assert!(v.visible_to(1, Some(1), now));
        }
    }
}
