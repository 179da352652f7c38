// src/reference/http.rs
use std::io::{Cursor, Read};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;

use super::{parse_sdn_xml, ReferenceSource};
use crate::index::ReferenceEntry;

pub const DEFAULT_SDN_ZIP_URL: &str = "https://www.treasury.gov/ofac/downloads/sdn_xml.zip";
pub const DEFAULT_SDN_XML_URL: &str = "https://www.treasury.gov/ofac/downloads/sdn.xml";
pub const ENV_SDN_ZIP_URL: &str = "OFAC_SDN_XML_ZIP_URL";
pub const ENV_SDN_XML_URL: &str = "OFAC_SDN_XML_URL";

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads and parses the SDN list on every fetch: the zipped XML first, the plain
/// XML when the archive cannot be fetched or unpacked.
pub struct HttpSdnSource {
    zip_url: String,
    xml_url: String,
    client: reqwest::Client,
}

impl HttpSdnSource {
    pub fn new(zip_url: impl Into<String>, xml_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("building sdn http client")?;
        Ok(Self {
            zip_url: zip_url.into(),
            xml_url: xml_url.into(),
            client,
        })
    }

    /// `$OFAC_SDN_XML_ZIP_URL` / `$OFAC_SDN_XML_URL`, else the Treasury download URLs.
    pub fn from_env() -> Result<Self> {
        let zip_url =
            std::env::var(ENV_SDN_ZIP_URL).unwrap_or_else(|_| DEFAULT_SDN_ZIP_URL.to_string());
        let xml_url =
            std::env::var(ENV_SDN_XML_URL).unwrap_or_else(|_| DEFAULT_SDN_XML_URL.to_string());
        Self::new(zip_url, xml_url)
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "reference", error = ?e, url = %url, "sdn http error");
                counter!("reference_fetch_errors_total").increment(1);
                return Err(e).context("sdn http get()");
            }
        };
        let body = resp
            .error_for_status()
            .context("sdn http status")?
            .bytes()
            .await
            .context("sdn http body")?;
        Ok(body.to_vec())
    }

    /// Raw XML and the URL that produced it.
    async fn download(&self) -> Result<(Vec<u8>, String)> {
        let zipped = match self.get(&self.zip_url).await {
            Ok(bytes) => extract_first_xml(&bytes),
            Err(e) => Err(e),
        };
        match zipped {
            Ok(xml) => return Ok((xml, self.zip_url.clone())),
            Err(e) => tracing::warn!(
                target: "reference",
                error = %format!("{e:#}"),
                url = %self.zip_url,
                "sdn zip unavailable, falling back to xml"
            ),
        }
        let xml = self.get(&self.xml_url).await?;
        Ok((xml, self.xml_url.clone()))
    }
}

/// First `.xml` member of a zip archive, in archive order.
pub fn extract_first_xml(archive: &[u8]) -> Result<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).context("opening sdn zip")?;
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).context("reading sdn zip entry")?;
        if !file.name().to_ascii_lowercase().ends_with(".xml") {
            continue;
        }
        let mut xml = Vec::new();
        file.read_to_end(&mut xml)
            .with_context(|| format!("inflating {}", file.name()))?;
        return Ok(xml);
    }
    bail!("sdn zip has no .xml member")
}

#[async_trait]
impl ReferenceSource for HttpSdnSource {
    async fn fetch_entries(&self) -> Result<Vec<ReferenceEntry>> {
        Ok(self.fetch_with_origin().await?.0)
    }

    fn name(&self) -> &'static str {
        "sdn-http"
    }

    async fn fetch_with_origin(&self) -> Result<(Vec<ReferenceEntry>, String)> {
        let (xml, url) = self.download().await?;
        let entries = parse_sdn_xml(&xml)?;
        tracing::info!(target: "reference", url = %url, entries = entries.len(), "sdn list downloaded");
        Ok((entries, url))
    }
}
