use thiserror::Error;

use crate::models::listing::{ListingRecord, ListingSource, RawListing};

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("listing is missing required field '{0}'")]
    MissingField(&'static str),
}

/// Maps a raw source record onto the canonical listing shape.
///
/// Title, company, location and url are required; a record missing any of
/// them (or holding only whitespace) is discarded. A missing id falls back to
/// the url, which is just as stable across fetches.
pub fn normalize(raw: &RawListing, source: ListingSource) -> Result<ListingRecord, NormalizeError> {
    let title = required(raw.title.as_deref(), "title")?;
    let company = required(raw.company_name().as_deref(), "company")?;
    let location = required(raw.location.as_deref(), "location")?;
    let url = required(raw.url.as_deref(), "url")?;

    let id = raw
        .id_text()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| url.clone());

    Ok(ListingRecord {
        id,
        title,
        company,
        location,
        description: raw.description.as_deref().unwrap_or("").trim().to_string(),
        url,
        source,
    })
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, NormalizeError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or(NormalizeError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawListing {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_complete_record_normalizes() {
        let listing = normalize(
            &raw(json!({
                "id": 42,
                "title": " Head of Growth ",
                "company": {"name": "Acme DeFi"},
                "location": "Remote",
                "url": "https://jobs.example/42"
            })),
            ListingSource::LinkedIn,
        )
        .unwrap();

        assert_eq!(listing.id, "42");
        assert_eq!(listing.title, "Head of Growth");
        assert_eq!(listing.company, "Acme DeFi");
        assert_eq!(listing.description, "");
        assert_eq!(listing.source, ListingSource::LinkedIn);
    }

    #[test]
    fn test_missing_id_falls_back_to_url() {
        let listing = normalize(
            &raw(json!({
                "title": "VP Marketing",
                "company": "Acme",
                "location": "Austin, TX",
                "url": "https://jobs.example/vp"
            })),
            ListingSource::LinkedIn,
        )
        .unwrap();
        assert_eq!(listing.id, "https://jobs.example/vp");
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        let complete = json!({
            "title": "VP Marketing",
            "company": "Acme",
            "location": "Austin, TX",
            "url": "https://jobs.example/vp"
        });
        for field in ["title", "company", "location", "url"] {
            let mut value = complete.clone();
            value.as_object_mut().unwrap().remove(field);
            assert_eq!(
                normalize(&raw(value), ListingSource::LinkedIn),
                Err(NormalizeError::MissingField(field))
            );
        }
    }

    #[test]
    fn test_blank_company_is_missing() {
        let result = normalize(
            &raw(json!({
                "title": "VP Marketing",
                "company": "  ",
                "location": "Remote",
                "url": "https://jobs.example/vp"
            })),
            ListingSource::Indeed,
        );
        assert_eq!(result, Err(NormalizeError::MissingField("company")));
    }
}
