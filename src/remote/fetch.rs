use std::{path::Path, time::Duration};

use log::debug;
use reqwest::{blocking::Client, StatusCode};
use tempfile::NamedTempFile;

use super::extract_hrefs;

use crate::errors::KeoDataErr;

/// Some servers in the archive refuse requests without a browser-like user agent.
pub const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/120.0.0.0 Safari/537.36";

/// Map an HTTP status to an error, 404 being [`KeoDataErr::RemoteNotFound`].
pub fn check_status(url: &str, status: StatusCode) -> Result<(), KeoDataErr> {
    if status == StatusCode::NOT_FOUND {
        Err(KeoDataErr::RemoteNotFound(url.to_owned()))
    } else if !status.is_success() {
        Err(KeoDataErr::HttpStatus(url.to_owned(), status.as_u16()))
    } else {
        Ok(())
    }
}

/// A blocking HTTP client for index pages and data files.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a client that gives up on a request after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, KeoDataErr> {
        let client = Client::builder()
            .user_agent(BROWSER_UA)
            .timeout(timeout)
            .build()?;

        Ok(Fetcher { client })
    }

    /// Body of a page as text.
    pub fn get_text(&self, url: &str) -> Result<String, KeoDataErr> {
        debug!("GET {}", url);
        let response = self.client.get(url).send()?;
        check_status(url, response.status())?;
        Ok(response.text()?)
    }

    /// Links on an index page.
    pub fn index(&self, url: &str) -> Result<Vec<String>, KeoDataErr> {
        Ok(extract_hrefs(&self.get_text(url)?))
    }

    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// The body goes to a temporary file next to `dest` which is renamed once complete, so an
    /// interrupted download never leaves a partial file behind.
    pub fn download(&self, url: &str, dest: &Path) -> Result<u64, KeoDataErr> {
        debug!("GET {} -> {}", url, dest.display());
        let mut response = self.client.get(url).send()?;
        check_status(url, response.status())?;

        let dir = match dest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        let bytes = response.copy_to(&mut tmp)?;
        tmp.persist(dest)?;

        Ok(bytes)
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
