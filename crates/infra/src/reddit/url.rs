const MAX_ID_LEN: usize = 13;

/// Extracts the base36 submission id from a Reddit post url.
///
/// Accepts `reddit.com/r/<sub>/comments/<id>/...`, `reddit.com/comments/<id>`,
/// `reddit.com/user/<name>/comments/<id>`, `reddit.com/gallery/<id>` and
/// `redd.it/<id>`. Listing pages, share links and foreign hosts yield `None`.
pub fn submission_id_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let rest = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
    let host = normalize_host(authority);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();

    let id = if host == "redd.it" {
        match segments.as_slice() {
            [id] => *id,
            _ => return None,
        }
    } else if host == "reddit.com" || host.ends_with(".reddit.com") {
        match segments.as_slice() {
            ["r", _, "comments", id, ..]
            | ["user" | "u", _, "comments", id, ..]
            | ["comments", id, ..]
            | ["gallery", id, ..] => *id,
            _ => return None,
        }
    } else {
        return None;
    };

    let id = id.to_ascii_lowercase();
    is_valid_id(&id).then_some(id)
}

fn normalize_host(authority: &str) -> String {
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    host.to_ascii_lowercase()
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_ID_LEN && id.chars().all(|ch| ch.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::submission_id_from_url;

    #[test]
    fn extracts_from_subreddit_permalink() {
        let url = "https://www.reddit.com/r/pokemon/comments/1abcde/giveaway_time/";
        assert_eq!(submission_id_from_url(url), Some("1abcde".to_string()));
    }

    #[test]
    fn extracts_from_comment_permalink() {
        let url = "https://old.reddit.com/r/pokemon/comments/1abcde/giveaway/kx9z1/?context=3";
        assert_eq!(submission_id_from_url(url), Some("1abcde".to_string()));
    }

    #[test]
    fn extracts_from_short_links() {
        assert_eq!(
            submission_id_from_url("https://redd.it/1abcde"),
            Some("1abcde".to_string())
        );
        assert_eq!(
            submission_id_from_url("reddit.com/comments/1abcde"),
            Some("1abcde".to_string())
        );
        assert_eq!(
            submission_id_from_url("https://www.reddit.com/gallery/1abcde"),
            Some("1abcde".to_string())
        );
    }

    #[test]
    fn rejects_listings_and_foreign_hosts() {
        assert!(submission_id_from_url("https://www.reddit.com/r/pokemon/").is_none());
        assert!(submission_id_from_url("https://www.reddit.com/r/pokemon/s/AbCdEf").is_none());
        assert!(submission_id_from_url("https://example.com/comments/1abcde").is_none());
        assert!(submission_id_from_url("https://notreddit.com/comments/1abcde").is_none());
        assert!(submission_id_from_url("not a url").is_none());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(submission_id_from_url("https://redd.it/abc-def").is_none());
        assert!(submission_id_from_url("https://redd.it/").is_none());
    }
}
