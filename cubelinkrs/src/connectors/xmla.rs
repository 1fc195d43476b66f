//! Direct XMLA connector.
//!
//! Submits MDX over the XML for Analysis SOAP protocol: one Execute call
//! per statement, tabular response format, optional HTTP basic auth. No
//! explicit session teardown is required by the protocol.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Value};

use crate::config::XmlaConfig;
use crate::error::{MdxError, Result};
use crate::executor::{ColumnMeta, QueryResult};

use super::OlapConnection;

const SOAP_ACTION: &str = "\"urn:schemas-microsoft-com:xml-analysis:Execute\"";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub struct XmlaConnection {
    client: reqwest::Client,
    config: XmlaConfig,
}

impl XmlaConnection {
    pub fn new(config: XmlaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| MdxError::Execution(format!("create XMLA client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &XmlaConfig {
        &self.config
    }

    async fn post_execute(&self, envelope: String) -> anyhow::Result<String> {
        let mut request = self
            .client
            .post(&self.config.server)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", SOAP_ACTION)
            .body(envelope);

        if let Some(user) = &self.config.user {
            let password = self.config.password.as_deref().unwrap_or_default();
            let credentials = STANDARD.encode(format!("{user}:{password}"));
            request = request.header("Authorization", format!("Basic {credentials}"));
        }

        let send = request.send();
        let response = tokio::time::timeout(Duration::from_millis(self.config.timeout_ms), send)
            .await
            .map_err(|_| anyhow!("XMLA request timed out after {}ms", self.config.timeout_ms))?
            .context("XMLA request failed")?;

        // Faulted Execute calls come back as HTTP 500 with a SOAP fault in
        // the body, so the body is read before any status check.
        let status = response.status();
        let body = response.text().await.context("read XMLA response body")?;
        if !status.is_success() && !body.contains("Fault") {
            return Err(anyhow!("XMLA endpoint returned {status}"));
        }
        Ok(body)
    }
}

#[async_trait]
impl OlapConnection for XmlaConnection {
    async fn execute_mdx(&self, mdx: &str) -> Result<QueryResult> {
        let envelope = execute_envelope(mdx, &self.config.catalog);
        let start = Instant::now();

        let body = self
            .post_execute(envelope)
            .await
            .map_err(|e| MdxError::query_failed(mdx, e))?;
        let result = parse_tabular_response(&body).map_err(|e| MdxError::query_failed(mdx, e))?;

        tracing::debug!(
            server = %self.config.server,
            catalog = %self.config.catalog,
            rows = result.rows.len(),
            ms = start.elapsed().as_millis(),
            "xmla execute"
        );
        Ok(result)
    }
}

/// SOAP Execute envelope with the tabular response format, so the result
/// arrives as a flat rowset instead of a multidimensional dataset.
fn execute_envelope(mdx: &str, catalog: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <Execute xmlns="urn:schemas-microsoft-com:xml-analysis">
      <Command>
        <Statement>{}</Statement>
      </Command>
      <Properties>
        <PropertyList>
          <DataSourceInfo/>
          <Catalog>{}</Catalog>
          <Format>Tabular</Format>
          <Content>Data</Content>
        </PropertyList>
      </Properties>
    </Execute>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
        xml_escape(mdx),
        xml_escape(catalog)
    )
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render the tabular rowset into row dictionaries keyed by the decoded
/// column names (normally the raw member addresses).
fn parse_tabular_response(xml: &str) -> anyhow::Result<QueryResult> {
    let doc = roxmltree::Document::parse(xml).context("parse XMLA response")?;

    if let Some(fault) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Fault")
    {
        let reason = fault
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "faultstring")
            .and_then(|n| n.text())
            .unwrap_or("unknown SOAP fault");
        return Err(anyhow!("SOAP fault: {reason}"));
    }

    let mut columns: Vec<ColumnMeta> = Vec::new();
    let mut rows: Vec<Map<String, Value>> = Vec::new();

    for row_node in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "row")
    {
        let mut row = Map::new();
        for cell in row_node.children().filter(|n| n.is_element()) {
            let name = decode_xmla_name(cell.tag_name().name());
            if !columns.iter().any(|c| c.name == name) {
                columns.push(ColumnMeta { name: name.clone() });
            }
            row.insert(name, cell_value(&cell));
        }
        rows.push(row);
    }

    Ok(QueryResult { columns, rows })
}

/// Absent cells are absent elements in the tabular format, so anything we
/// see here has text. Numeric xsd types are converted; everything else
/// stays a string.
fn cell_value(cell: &roxmltree::Node<'_, '_>) -> Value {
    let text = cell.text().unwrap_or_default();
    let xsi_type = cell
        .attribute((XSI_NS, "type"))
        .map(|t| t.rsplit(':').next().unwrap_or(t));
    match xsi_type {
        Some("int") | Some("integer") | Some("long") | Some("short") | Some("byte")
        | Some("unsignedInt") | Some("unsignedLong") => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        Some("double") | Some("float") | Some("decimal") => text
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        Some("boolean") => match text {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            other => Value::String(other.to_string()),
        },
        _ => Value::String(text.to_string()),
    }
}

/// The tabular format encodes characters that are illegal in XML element
/// names as `_xHHHH_` sequences; `[Measures].[Sales]` arrives as
/// `_x005B_Measures_x005D_._x005B_Sales_x005D_`.
fn decode_xmla_name(encoded: &str) -> String {
    let mut decoded = String::with_capacity(encoded.len());
    let mut rest = encoded;
    while let Some(start) = rest.find("_x") {
        let candidate = &rest[start..];
        let escape = candidate.len() >= 7
            && candidate.as_bytes()[6] == b'_'
            && candidate[2..6].bytes().all(|b| b.is_ascii_hexdigit());
        if escape {
            if let Some(c) = u32::from_str_radix(&candidate[2..6], 16)
                .ok()
                .and_then(char::from_u32)
            {
                decoded.push_str(&rest[..start]);
                decoded.push(c);
                rest = &candidate[7..];
                continue;
            }
        }
        // Not an escape; keep the underscore and move past it.
        decoded.push_str(&rest[..start + 1]);
        rest = &rest[start + 1..];
    }
    decoded.push_str(rest);
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_encoded_column_names() {
        assert_eq!(
            decode_xmla_name("_x005B_Measures_x005D_._x005B_Sales_x0020_Amount_x005D_"),
            "[Measures].[Sales Amount]"
        );
        assert_eq!(decode_xmla_name("plain"), "plain");
        assert_eq!(decode_xmla_name("trailing_x"), "trailing_x");
    }

    #[test]
    fn envelope_escapes_the_statement() {
        let envelope = execute_envelope("SELECT <x> & 'y'", "Adventure Works");
        assert!(envelope.contains("SELECT &lt;x&gt; &amp; &apos;y&apos;"));
        assert!(envelope.contains("<Catalog>Adventure Works</Catalog>"));
        assert!(envelope.contains("<Format>Tabular</Format>"));
    }

    #[test]
    fn parses_rows_and_types_from_a_tabular_response() {
        let xml = r#"<?xml version="1.0"?>
<Envelope xmlns="http://schemas.xmlsoap.org/soap/envelope/">
  <Body>
    <ExecuteResponse xmlns="urn:schemas-microsoft-com:xml-analysis">
      <return>
        <root xmlns="urn:schemas-microsoft-com:xml-analysis:rowset"
              xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
          <row>
            <_x005B_Customer_x005D_._x005B_Country_x005D_>Germany</_x005B_Customer_x005D_._x005B_Country_x005D_>
            <_x005B_Measures_x005D_._x005B_Sales_x005D_ xsi:type="xsd:double">12.5</_x005B_Measures_x005D_._x005B_Sales_x005D_>
          </row>
          <row>
            <_x005B_Customer_x005D_._x005B_Country_x005D_>France</_x005B_Customer_x005D_._x005B_Country_x005D_>
          </row>
        </root>
      </return>
    </ExecuteResponse>
  </Body>
</Envelope>"#;
        let result = parse_tabular_response(xml).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(
            result.rows[0]["[Customer].[Country]"],
            Value::String("Germany".to_string())
        );
        assert_eq!(result.rows[0]["[Measures].[Sales]"], Value::from(12.5));
        assert!(!result.rows[1].contains_key("[Measures].[Sales]"));
        assert_eq!(result.columns.len(), 2);
    }

    #[test]
    fn soap_fault_surfaces_the_fault_string() {
        let xml = r#"<Envelope xmlns="http://schemas.xmlsoap.org/soap/envelope/">
  <Body><Fault><faultcode>c</faultcode><faultstring>bad cube</faultstring></Fault></Body>
</Envelope>"#;
        let err = parse_tabular_response(xml).unwrap_err();
        assert!(err.to_string().contains("bad cube"));
    }
}
