//! Scraping Apache style directory listings.

/// Every `href` target in an HTML page, in document order.
///
/// Double quoted, single quoted and unquoted values are all accepted, the attribute name is
/// matched case insensitively and a leading `./` is removed.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let lower = html.to_ascii_lowercase();
    let bytes = html.as_bytes();
    let mut hrefs = vec![];
    let mut search_from = 0;

    while let Some(found) = lower[search_from..].find("href") {
        let mut pos = search_from + found + 4;
        search_from = pos;

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] != b'=' {
            continue;
        }
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let (start, end) = match bytes[pos] {
            quote @ b'"' | quote @ b'\'' => {
                let start = pos + 1;
                match html[start..].find(quote as char) {
                    Some(len) => (start, start + len),
                    None => break,
                }
            }
            _ => {
                let len = html[pos..]
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(html.len() - pos);
                (pos, pos + len)
            }
        };
        search_from = end;

        let href = html[start..end].trim();
        let href = href.strip_prefix("./").unwrap_or(href);
        if !href.is_empty() {
            hrefs.push(href.to_owned());
        }
    }

    hrefs
}

/// Last path component of a link, ignoring trailing slashes.
pub fn last_component(href: &str) -> &str {
    let trimmed = href.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Hours with a `utHH/` directory among the links, sorted and without repeats.
pub fn scrape_hours(hrefs: &[String]) -> Vec<u8> {
    let mut hours: Vec<u8> = hrefs
        .iter()
        .filter_map(|href| {
            let name = last_component(href);
            let digits = name
                .get(..2)
                .filter(|prefix| prefix.eq_ignore_ascii_case("ut"))
                .map(|_| &name[2..])?;

            if digits.is_empty()
                || digits.len() > 2
                || !digits.bytes().all(|b| b.is_ascii_digit())
            {
                return None;
            }

            digits.parse::<u8>().ok().filter(|h| *h <= 24)
        })
        .collect();

    hours.sort_unstable();
    hours.dedup();
    hours
}

/// First hour and the end of the last hour, `None` without any hours.
///
/// The end is capped at 24.
pub fn time_bounds(hours: &[u8]) -> Option<(u8, u8)> {
    let first = *hours.iter().min()?;
    let last = *hours.iter().max()?;
    Some((first, (last + 1).min(24)))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    const LISTING: &str = r#"<html><body>
<a href="?C=N;O=D">Name</a>
<A HREF="../">Parent Directory</A>
<a href='ut03/'>ut03/</a>
<a href=ut01/>ut01/</a>
<a href = "./ut10/">ut10/</a>
<a href="/amisr_archive/2025/11/25/pfrr_amisr01/ut3/">again</a>
<a href="20251125__pfrr_asi3_full-keo-rgb.png">keo</a>
<a href="ut25/">bogus</a>
<a href="utility/">not an hour</a>
</body></html>"#;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_extract_hrefs() {
        let hrefs = extract_hrefs(LISTING);
        assert_eq!(
            hrefs,
            strings(&[
                "?C=N;O=D",
                "../",
                "ut03/",
                "ut01/",
                "ut10/",
                "/amisr_archive/2025/11/25/pfrr_amisr01/ut3/",
                "20251125__pfrr_asi3_full-keo-rgb.png",
                "ut25/",
                "utility/",
            ])
        );

        assert!(extract_hrefs("no links here").is_empty());
        assert!(extract_hrefs("<a href=\"unterminated").is_empty());
    }

    #[test]
    fn test_last_component() {
        assert_eq!(last_component("ut03/"), "ut03");
        assert_eq!(last_component("/a/b/ut3/"), "ut3");
        assert_eq!(last_component("file.png"), "file.png");
    }

    #[test]
    fn test_scrape_hours() {
        let hours = scrape_hours(&extract_hrefs(LISTING));
        assert_eq!(hours, vec![1, 3, 10]);

        let hours = scrape_hours(&strings(&["UT00/", "ut24/", "ut5"]));
        assert_eq!(hours, vec![0, 5, 24]);
    }

    #[test]
    fn test_time_bounds() {
        assert_eq!(time_bounds(&[1, 3, 10]), Some((1, 11)));
        assert_eq!(time_bounds(&[5]), Some((5, 6)));
        assert_eq!(time_bounds(&[0, 24]), Some((0, 24)));
        assert_eq!(time_bounds(&[]), None);
    }
}
