use tracing::{debug, warn};

/// One data line of a published sheet, keyed by the header row.
///
/// Header order is preserved. Values are trimmed and unquoted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Exact, case-sensitive header lookup.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value.as_str())
    }

    /// First non-empty value among `candidates`, headers compared case-insensitively.
    pub fn field(&self, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|candidate| {
            self.fields
                .iter()
                .find(|(key, value)| key.eq_ignore_ascii_case(candidate) && !value.is_empty())
                .map(|(_, value)| value.as_str())
        })
    }

    /// Like [`RawRow::field`] but yields `""` when nothing matches.
    pub fn text(&self, candidates: &[&str]) -> &str {
        self.field(candidates).unwrap_or("")
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

}

/// Parse published CSV text into rows keyed by its header line.
///
/// Input with no header or no data lines yields an empty vector rather than an error.
pub fn parse(text: &str) -> Vec<RawRow> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        debug!("CSV input has {} non-blank lines, nothing to parse", lines.len());
        return Vec::new();
    }

    let headers: Vec<String> = tokenize(lines[0])
        .into_iter()
        .map(|header| header.replace('"', "").trim().to_string())
        .collect();
    debug!("Parsed CSV header: {:?}", headers);

    let rows: Vec<RawRow> = lines[1..]
        .iter()
        .map(|line| {
            let values = tokenize(line);
            RawRow {
                fields: headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        let value = values
                            .get(i)
                            .map(|v| v.trim_matches('"').to_string())
                            .unwrap_or_default();
                        (header.clone(), value)
                    })
                    .collect(),
            }
        })
        .collect();

    debug!("Parsed {} CSV rows", rows.len());
    rows
}

/// Split one line into trimmed fields, honouring double-quoted fields and `""` escapes.
fn tokenize(line: &str) -> Vec<String> {
    let line = strip_field_padding(line);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.iter().map(|field| field.trim().to_string()).collect(),
        Ok(false) => Vec::new(),
        Err(e) => {
            warn!("Failed to tokenize CSV line: {} - {}", e, line);
            Vec::new()
        }
    }
}

/// Drop blanks at the start of each unquoted field so a padded `, "a, b"` still opens a quoted field.
fn strip_field_padding(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_quotes = false;
    let mut field_start = true;

    for c in line.chars() {
        if field_start && !in_quotes && (c == ' ' || c == '\t') {
            continue;
        }
        field_start = false;
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => field_start = true,
            _ => {}
        }
        out.push(c);
    }
    out
}
