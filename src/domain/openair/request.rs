//! Outbound request document for the OpenAir XML API.
//!
//! A document carries the application identity, the login tuple and one or
//! more commands:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
//! <request API_ver="1.0" client="Tempus Fugit" client_ver="1.0" namespace="default" key="KEY">
//!   <Auth><Login><company>BFA</company><user>USER</user><password>PASS</password></Login></Auth>
//!   <Read type="Task" method="equal to" limit="1000" filter="newer-than" field="date">
//!     <Date><month>01</month><day>01</day><year>2016</year></Date>
//!     <Task><projectid>313</projectid></Task>
//!     <_Return><id/><timesheetid/></_Return>
//!   </Read>
//! </request>
//! ```

use chrono::NaiveDate;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fmt::Display;

use crate::domain::entities::Credentials;
use crate::domain::gateway::GatewayError;

/// Version of the XML API the documents are written against.
pub const API_VERSION: &str = "1.0";

/// Identity of the calling application, sent as attributes of `<request>`.
#[derive(Clone)]
pub struct ApplicationIdentity {
    pub client: String,
    pub client_version: String,
    pub namespace: String,
    pub api_key: String,
}

impl std::fmt::Debug for ApplicationIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationIdentity")
            .field("client", &self.client)
            .field("client_version", &self.client_version)
            .field("namespace", &self.namespace)
            .field("api_key", &"***")
            .finish()
    }
}

/// A filter applied to a `Read` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadFilter {
    /// Records whose `field` is newer than `date`.
    NewerThan { field: String, date: NaiveDate },
    /// Records of type `record` whose fields equal the given values.
    Matching {
        record: String,
        fields: Vec<(String, String)>,
    },
}

impl ReadFilter {
    /// Returns the `(filter, field)` attribute pair this filter contributes,
    /// if any. Plain matches are expressed by the embedded record alone.
    fn attributes(&self) -> Option<(&'static str, &str)> {
        match self {
            ReadFilter::NewerThan { field, .. } => Some(("newer-than", field.as_str())),
            ReadFilter::Matching { .. } => None,
        }
    }
}

/// A bounded `Read` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCommand {
    pub record_type: String,
    pub method: String,
    pub limit: u32,
    pub filters: Vec<ReadFilter>,
    pub return_fields: Vec<String>,
}

/// Task query sent alongside every login.
///
/// The accounting service only reports an `Auth` status when the request
/// carries at least one command, so the login exchange piggybacks on a
/// task read for one project since a given date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub since: NaiveDate,
    pub project_id: String,
    pub limit: u32,
}

impl TaskQuery {
    /// Builds the `Read` command for this query.
    pub fn to_read_command(&self) -> ReadCommand {
        ReadCommand {
            record_type: "Task".to_string(),
            method: "equal to".to_string(),
            limit: self.limit,
            filters: vec![
                ReadFilter::NewerThan {
                    field: "date".to_string(),
                    date: self.since,
                },
                ReadFilter::Matching {
                    record: "Task".to_string(),
                    fields: vec![("projectid".to_string(), self.project_id.clone())],
                },
            ],
            return_fields: vec!["id".to_string(), "timesheetid".to_string()],
        }
    }
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            since: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default(),
            project_id: "313".to_string(),
            limit: 1000,
        }
    }
}

/// A complete request document, ready to be serialized.
#[derive(Debug)]
pub struct RequestDocument<'a> {
    application: &'a ApplicationIdentity,
    credentials: &'a Credentials,
    commands: Vec<ReadCommand>,
}

impl<'a> RequestDocument<'a> {
    pub fn new(
        application: &'a ApplicationIdentity,
        credentials: &'a Credentials,
        commands: Vec<ReadCommand>,
    ) -> Self {
        Self {
            application,
            credentials,
            commands,
        }
    }

    pub fn commands(&self) -> &[ReadCommand] {
        &self.commands
    }

    /// Serializes the document. Text and attribute values are escaped.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Encode`] if the writer fails.
    pub fn to_xml(&self) -> Result<String, GatewayError> {
        let mut out = XmlOut::new();

        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let app = self.application;
        out.start(
            "request",
            &[
                ("API_ver", API_VERSION),
                ("client", &app.client),
                ("client_ver", &app.client_version),
                ("namespace", &app.namespace),
                ("key", &app.api_key),
            ],
        )?;

        out.start("Auth", &[])?;
        out.start("Login", &[])?;
        out.text_element("company", &self.credentials.company)?;
        out.text_element("user", &self.credentials.username)?;
        out.text_element("password", &self.credentials.password)?;
        out.end("Login")?;
        out.end("Auth")?;

        for command in &self.commands {
            write_read(&mut out, command)?;
        }

        out.end("request")?;
        out.finish()
    }
}

fn write_read(out: &mut XmlOut, command: &ReadCommand) -> Result<(), GatewayError> {
    let limit = command.limit.to_string();
    let (kinds, fields): (Vec<&str>, Vec<&str>) = command
        .filters
        .iter()
        .filter_map(ReadFilter::attributes)
        .unzip();
    let kinds = kinds.join(",");
    let fields = fields.join(",");

    let mut attrs = vec![
        ("type", command.record_type.as_str()),
        ("method", command.method.as_str()),
        ("limit", limit.as_str()),
    ];
    if !kinds.is_empty() {
        attrs.push(("filter", kinds.as_str()));
        attrs.push(("field", fields.as_str()));
    }

    out.start("Read", &attrs)?;

    for filter in &command.filters {
        match filter {
            ReadFilter::NewerThan { date, .. } => {
                out.start("Date", &[])?;
                out.text_element("month", &date.format("%m").to_string())?;
                out.text_element("day", &date.format("%d").to_string())?;
                out.text_element("year", &date.format("%Y").to_string())?;
                out.end("Date")?;
            }
            ReadFilter::Matching { record, fields } => {
                out.start(record, &[])?;
                for (name, value) in fields {
                    out.text_element(name, value)?;
                }
                out.end(record)?;
            }
        }
    }

    if !command.return_fields.is_empty() {
        out.start("_Return", &[])?;
        for field in &command.return_fields {
            out.empty(field)?;
        }
        out.end("_Return")?;
    }

    out.end("Read")
}

fn encode_error(e: impl Display) -> GatewayError {
    GatewayError::Encode(e.to_string())
}

/// Thin wrapper over the quick-xml writer with element helpers.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), GatewayError> {
        self.writer.write_event(event).map_err(encode_error)
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), GatewayError> {
        let mut element = BytesStart::new(name);
        for attr in attrs {
            element.push_attribute(*attr);
        }
        self.event(Event::Start(element))
    }

    fn end(&mut self, name: &str) -> Result<(), GatewayError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str) -> Result<(), GatewayError> {
        self.event(Event::Empty(BytesStart::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), GatewayError> {
        self.start(name, &[])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String, GatewayError> {
        String::from_utf8(self.writer.into_inner()).map_err(encode_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> ApplicationIdentity {
        ApplicationIdentity {
            client: "Tempus Fugit".to_string(),
            client_version: "1.0".to_string(),
            namespace: "default".to_string(),
            api_key: "KEY123".to_string(),
        }
    }

    fn render(credentials: &Credentials) -> String {
        let app = application();
        let doc = RequestDocument::new(
            &app,
            credentials,
            vec![TaskQuery::default().to_read_command()],
        );
        doc.to_xml().unwrap()
    }

    #[test]
    fn test_document_header_and_identity() {
        let xml = render(&Credentials::new("alice@example.com", "x", "BFA"));

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains(
            r#"<request API_ver="1.0" client="Tempus Fugit" client_ver="1.0" namespace="default" key="KEY123">"#
        ));
        assert!(xml.ends_with("</request>"));
    }

    #[test]
    fn test_document_login_block() {
        let xml = render(&Credentials::new("alice@example.com", "secret", "BFA"));

        assert!(xml.contains(
            "<Auth><Login><company>BFA</company><user>alice@example.com</user><password>secret</password></Login></Auth>"
        ));
    }

    #[test]
    fn test_document_read_command() {
        let xml = render(&Credentials::new("alice@example.com", "x", "BFA"));

        assert!(xml.contains(
            r#"<Read type="Task" method="equal to" limit="1000" filter="newer-than" field="date">"#
        ));
        assert!(xml.contains("<Date><month>01</month><day>01</day><year>2016</year></Date>"));
        assert!(xml.contains("<Task><projectid>313</projectid></Task>"));
        assert!(xml.contains("<_Return><id/><timesheetid/></_Return></Read>"));
    }

    #[test]
    fn test_document_escapes_reserved_characters() {
        let xml = render(&Credentials::new("a&b@example.com", "<p\"w>&", "B&F"));

        assert!(xml.contains("<user>a&amp;b@example.com</user>"));
        assert!(xml.contains("<password>&lt;p&quot;w&gt;&amp;</password>"));
        assert!(xml.contains("<company>B&amp;F</company>"));
        assert!(!xml.contains("<p\"w>"));
    }

    #[test]
    fn test_document_escapes_api_key_attribute() {
        let mut app = application();
        app.api_key = "k\"ey".to_string();
        let credentials = Credentials::new("alice@example.com", "x", "BFA");
        let xml = RequestDocument::new(&app, &credentials, vec![])
            .to_xml()
            .unwrap();

        assert!(xml.contains(r#"key="k&quot;ey""#));
    }

    #[test]
    fn test_custom_task_query() {
        let query = TaskQuery {
            since: NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
            project_id: "42".to_string(),
            limit: 50,
        };
        let app = application();
        let credentials = Credentials::new("alice@example.com", "x", "BFA");
        let xml = RequestDocument::new(&app, &credentials, vec![query.to_read_command()])
            .to_xml()
            .unwrap();

        assert!(xml.contains(r#"limit="50""#));
        assert!(xml.contains("<Date><month>11</month><day>05</day><year>2024</year></Date>"));
        assert!(xml.contains("<Task><projectid>42</projectid></Task>"));
    }

    #[test]
    fn test_read_without_attribute_filters() {
        let command = ReadCommand {
            record_type: "Project".to_string(),
            method: "all".to_string(),
            limit: 10,
            filters: vec![],
            return_fields: vec![],
        };
        let mut out = XmlOut::new();
        write_read(&mut out, &command).unwrap();
        let xml = out.finish().unwrap();

        assert_eq!(xml, r#"<Read type="Project" method="all" limit="10"></Read>"#);
    }

    #[test]
    fn test_default_task_query() {
        let query = TaskQuery::default();

        assert_eq!(query.since, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(query.project_id, "313");
        assert_eq!(query.limit, 1000);
    }

    #[test]
    fn test_identity_debug_masks_key() {
        let debug = format!("{:?}", application());
        assert!(!debug.contains("KEY123"));
    }
}
