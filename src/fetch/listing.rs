// src/fetch/listing.rs

use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{instrument, trace, warn};
use url::Url;

use super::{get_with_retry, RetryPolicy};
use crate::config::ListingRules;
use crate::error::FetchError;

/// Pull the child entry names out of a directory listing page.
pub fn parse_entries(html: &str, rules: &ListingRules) -> Vec<String> {
    let selector = Selector::parse("a[href]").expect("CSS selector for anchors should be valid");
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for el in doc.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Some(name) = entry_name(href.trim(), rules) else {
            continue;
        };
        if seen.insert(name.clone()) {
            trace!(%name, "Found entry");
            entries.push(name);
        }
    }
    entries
}

fn entry_name(href: &str, rules: &ListingRules) -> Option<String> {
    let rest = href.strip_prefix(rules.entry_prefix.as_str())?;
    if rules
        .excluded_prefixes
        .iter()
        .any(|p| rest.starts_with(p.as_str()))
    {
        return None;
    }
    let name = rest.trim_end_matches('/');
    (!name.is_empty()).then(|| name.to_string())
}

/// List the entries under `url`. Any transport failure or non-success status is
/// `ListingUnavailable`; the caller decides whether that degrades to "no entries".
#[instrument(level = "debug", skip(client, url, rules, policy), fields(url = %url))]
pub async fn list_entries(
    client: &Client,
    url: &Url,
    rules: &ListingRules,
    policy: RetryPolicy,
) -> Result<Vec<String>, FetchError> {
    let unavailable = |source| FetchError::ListingUnavailable {
        url: url.to_string(),
        source,
    };
    let body = get_with_retry(client, url, policy)
        .await
        .map_err(unavailable)?
        .text()
        .await
        .map_err(unavailable)?;
    Ok(parse_entries(&body, rules))
}

/// `list_entries`, with an unavailable listing reported as empty.
pub async fn list_entries_or_empty(
    client: &Client,
    url: &Url,
    rules: &ListingRules,
    policy: RetryPolicy,
) -> Vec<String> {
    match list_entries(client, url, rules, policy).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Error listing items");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::test_server;

    const PAGE: &str = r#"<html><body>
<a href="../">Parent</a>
<a href="./Beijing-RADI/">Beijing-RADI/</a>
<a href="./Innsbruck/">Innsbruck/</a>
<a href="./operationfiles/">operationfiles/</a>
<a href="./../../up">up</a>
<a href="./javascript:void(0)">js</a>
<a href="javascript:history.back()">back</a>
<a href="./Innsbruck/">Innsbruck/</a>
<a href="/absolute/">abs</a>
<a href="./Pandora2s1_Innsbruck_L2_rout2p1-8.txt">file</a>
<a href="./">self</a>
</body></html>"#;

    #[test]
    fn keeps_relative_entries_only() {
        let entries = parse_entries(PAGE, &ListingRules::default());
        assert_eq!(
            entries,
            vec![
                "Beijing-RADI",
                "Innsbruck",
                "Pandora2s1_Innsbruck_L2_rout2p1-8.txt"
            ]
        );
    }

    #[test]
    fn excluded_prefixes_are_configurable() {
        let rules = ListingRules {
            excluded_prefixes: vec!["Inns".into()],
            ..ListingRules::default()
        };
        let entries = parse_entries(PAGE, &rules);
        assert!(entries.contains(&"operationfiles".to_string()));
        assert!(!entries.iter().any(|e| e.starts_with("Inns")));
    }

    #[tokio::test]
    async fn server_error_is_unavailable_and_degrades_to_empty() {
        let url = test_server::serve("500 Internal Server Error", b"boom".to_vec(), 2).await;
        let client = Client::new();
        let rules = ListingRules::default();

        let err = list_entries(&client, &url, &rules, RetryPolicy::none())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ListingUnavailable { .. }));

        let entries = list_entries_or_empty(&client, &url, &rules, RetryPolicy::none()).await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn lists_entries_from_server() -> anyhow::Result<()> {
        let url = test_server::serve("200 OK", PAGE.as_bytes().to_vec(), 1).await;
        let entries =
            list_entries(&Client::new(), &url, &ListingRules::default(), RetryPolicy::none())
                .await?;
        assert_eq!(entries.len(), 3);
        Ok(())
    }
}
