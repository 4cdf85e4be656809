//! Flat CSV form of adjacency rows, used only at persistence boundaries.
//!
//! Absent values are written as `none`. Auth keys are `id:secret` pairs
//! joined by `;`. Label columns, when present, follow the attribute columns.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

use super::{AdjacencyRow, Endpoint, LabeledRow};
use crate::error::{MismatchError, MismatchResult, TableError, TableResult};
use crate::labels::{Label, LabelVector};
use crate::model::AuthType;

const NONE: &str = "none";

/// Per-endpoint attribute columns, without the `_a` / `_b` suffix.
const ENDPOINT_FIELDS: [&str; 16] = [
    "router",
    "routing",
    "router_id",
    "redistribute",
    "interface",
    "ip",
    "subnet",
    "auth_key",
    "ospf_auth",
    "area",
    "network_type",
    "hello",
    "dead",
    "passive",
    "MTU",
    "neighbor",
];

/// Header of an unlabeled adjacency table.
pub fn columns() -> Vec<String> {
    let mut cols = vec!["topology".to_string()];
    for side in ["a", "b"] {
        cols.extend(ENDPOINT_FIELDS.iter().map(|f| format!("{f}_{side}")));
    }
    cols
}

/// Header of a labeled table.
pub fn labeled_columns() -> Vec<String> {
    let mut cols = columns();
    cols.extend(Label::ALL.iter().map(|l| l.name().to_string()));
    cols
}

// ── Auth key text form ─────────────────────────────────────────────────

/// `1:keyA;2:keyB`, or `none` when there are no keys.
///
/// A backslash, `;` or `,` inside a secret is escaped with a backslash.
pub fn format_auth_keys(keys: &BTreeMap<String, String>) -> String {
    if keys.is_empty() {
        return NONE.to_string();
    }
    keys.iter()
        .map(|(id, secret)| format!("{id}:{}", escape_key(secret)))
        .collect::<Vec<_>>()
        .join(";")
}

fn escape_key(secret: &str) -> String {
    let mut out = String::with_capacity(secret.len());
    for c in secret.chars() {
        if matches!(c, '\\' | ';' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split on unescaped `;` or `,`, resolving escapes.
fn split_key_entries(text: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => current.extend(chars.next()),
            ';' | ',' => entries.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    entries.push(current);
    entries
}

/// Inverse of [`format_auth_keys`]; also accepts `,` as separator.
///
/// An entry without `:` splits on its first space, else is a secret with an
/// empty id.
pub fn parse_auth_keys(text: &str) -> BTreeMap<String, String> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(NONE) {
        return BTreeMap::new();
    }
    split_key_entries(text)
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (id, secret) = p
                .split_once(':')
                .or_else(|| p.split_once(' '))
                .unwrap_or(("", p));
            (id.trim().to_string(), secret.trim().to_string())
        })
        .collect()
}

// ── Writing ────────────────────────────────────────────────────────────

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| NONE.to_string(), |v| v.to_string())
}

fn endpoint_fields(e: &Endpoint) -> Vec<String> {
    vec![
        e.router.clone(),
        e.routing.clone(),
        opt(&e.router_id),
        e.redistribute.to_string(),
        e.interface.clone(),
        opt(&e.ip),
        opt(&e.subnet),
        format_auth_keys(&e.auth_keys),
        e.auth_type.to_string(),
        opt(&e.area),
        opt(&e.network_type),
        opt(&e.hello),
        opt(&e.dead),
        opt(&e.passive),
        opt(&e.mtu),
        opt(&e.neighbor),
    ]
}

fn row_fields(row: &AdjacencyRow) -> Vec<String> {
    let mut fields = vec![row.topology.to_string()];
    fields.extend(endpoint_fields(&row.a));
    fields.extend(endpoint_fields(&row.b));
    fields
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

pub fn write_rows(rows: &[AdjacencyRow]) -> String {
    let mut out = String::new();
    write_record(&mut out, &columns());
    for row in rows {
        write_record(&mut out, &row_fields(row));
    }
    out
}

pub fn write_labeled(rows: &[LabeledRow]) -> String {
    let mut out = String::new();
    write_record(&mut out, &labeled_columns());
    for labeled in rows {
        let mut fields = row_fields(&labeled.row);
        fields.extend(Label::ALL.iter().map(|l| labeled.labels.get(*l).to_string()));
        write_record(&mut out, &fields);
    }
    out
}

// ── Reading ────────────────────────────────────────────────────────────

/// Split one CSV line, honoring double-quoted fields.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// A parsed CSV table with header-name lookup.
struct Table<'a> {
    source_name: &'a str,
    index: HashMap<String, usize>,
    /// (1-based line number, fields)
    records: Vec<(usize, Vec<String>)>,
}

impl<'a> Table<'a> {
    fn parse(text: &str, source_name: &'a str) -> TableResult<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or_else(|| TableError::Empty {
            source_name: source_name.to_string(),
        })?;
        let header = split_record(header);
        let index = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();

        let records = lines
            .map(|(n, l)| {
                let fields = split_record(l);
                if fields.len() != header.len() {
                    return Err(TableError::RaggedRow {
                        source_name: source_name.to_string(),
                        line: n,
                        expected: header.len(),
                        found: fields.len(),
                    });
                }
                Ok((n, fields))
            })
            .collect::<TableResult<Vec<_>>>()?;

        Ok(Self {
            source_name,
            index,
            records,
        })
    }

    fn require(&self, column: &str) -> TableResult<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| TableError::MissingColumn {
                column: column.to_string(),
                source_name: self.source_name.to_string(),
            })
    }

    fn invalid(&self, line: usize, column: &str, value: &str) -> TableError {
        TableError::InvalidValue {
            source_name: self.source_name.to_string(),
            line,
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}

fn is_none(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || ["none", "nan", "null"].iter().any(|n| v.eq_ignore_ascii_case(n))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Reads typed cells of one record, reporting the first bad value.
struct Cells<'t, 'a> {
    table: &'t Table<'a>,
    line: usize,
    fields: &'t [String],
}

impl Cells<'_, '_> {
    fn text(&self, column: &str) -> TableResult<String> {
        let idx = self.table.require(column)?;
        Ok(self.fields[idx].trim().to_string())
    }

    fn optional_text(&self, column: &str) -> TableResult<Option<String>> {
        let value = self.text(column)?;
        Ok((!is_none(&value)).then_some(value))
    }

    fn optional<T: FromStr>(&self, column: &str) -> TableResult<Option<T>> {
        match self.optional_text(column)? {
            None => Ok(None),
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| self.table.invalid(self.line, column, &v)),
        }
    }

    fn flag(&self, column: &str) -> TableResult<Option<bool>> {
        match self.optional_text(column)? {
            None => Ok(None),
            Some(v) => parse_bool(&v)
                .map(Some)
                .ok_or_else(|| self.table.invalid(self.line, column, &v)),
        }
    }

    fn endpoint(&self, side: &str) -> TableResult<Endpoint> {
        let col = |f: &str| format!("{f}_{side}");
        let auth_type = self.text(&col("ospf_auth"))?;
        Ok(Endpoint {
            router: self.text(&col("router"))?,
            routing: self.text(&col("routing"))?,
            router_id: self.optional_text(&col("router_id"))?,
            redistribute: self.flag(&col("redistribute"))?.unwrap_or(false),
            interface: self.text(&col("interface"))?,
            ip: self.optional_text(&col("ip"))?,
            subnet: self.optional_text(&col("subnet"))?,
            auth_keys: parse_auth_keys(&self.text(&col("auth_key"))?),
            auth_type: auth_type
                .parse::<AuthType>()
                .map_err(|_| self.table.invalid(self.line, &col("ospf_auth"), &auth_type))?,
            area: self.optional(&col("area"))?,
            network_type: self.optional_text(&col("network_type"))?,
            hello: self.optional(&col("hello"))?,
            dead: self.optional(&col("dead"))?,
            passive: self.flag(&col("passive"))?,
            mtu: self.optional(&col("MTU"))?,
            neighbor: self.optional_text(&col("neighbor"))?,
        })
    }

    fn row(&self) -> TableResult<AdjacencyRow> {
        let topology = self.text("topology")?;
        Ok(AdjacencyRow {
            topology: topology
                .parse()
                .map_err(|_| self.table.invalid(self.line, "topology", &topology))?,
            a: self.endpoint("a")?,
            b: self.endpoint("b")?,
        })
    }

    fn labels(&self) -> TableResult<LabelVector> {
        let mut labels = LabelVector::default();
        for label in Label::ALL {
            let value = self.text(label.name())?;
            let flag = parse_bool(&value).ok_or_else(|| self.table.invalid(self.line, label.name(), &value))?;
            labels.set(label, flag);
        }
        Ok(labels)
    }
}

fn check_schema(table: &Table<'_>, cols: &[String]) -> TableResult<()> {
    for col in cols {
        table.require(col)?;
    }
    Ok(())
}

/// Parse an adjacency table. Extra columns (e.g. labels) are ignored.
pub fn read_rows(text: &str, source_name: &str) -> TableResult<Vec<AdjacencyRow>> {
    let table = Table::parse(text, source_name)?;
    check_schema(&table, &columns())?;
    table
        .records
        .iter()
        .map(|(line, fields)| {
            Cells {
                table: &table,
                line: *line,
                fields,
            }
            .row()
        })
        .collect()
}

/// Parse a labeled table; all ten label columns are required.
pub fn read_labeled(text: &str, source_name: &str) -> TableResult<Vec<LabeledRow>> {
    let table = Table::parse(text, source_name)?;
    check_schema(&table, &labeled_columns())?;
    table
        .records
        .iter()
        .map(|(line, fields)| {
            let cells = Cells {
                table: &table,
                line: *line,
                fields,
            };
            Ok(LabeledRow {
                row: cells.row()?,
                labels: cells.labels()?,
            })
        })
        .collect()
}

// ── Files ──────────────────────────────────────────────────────────────

pub(crate) fn read_file(path: &Path) -> MismatchResult<String> {
    std::fs::read_to_string(path).map_err(|source| MismatchError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn write_file(path: &Path, content: &str) -> MismatchResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| MismatchError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| MismatchError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_rows(path: &Path) -> MismatchResult<Vec<AdjacencyRow>> {
    let text = read_file(path)?;
    Ok(read_rows(&text, &path.display().to_string())?)
}

pub fn load_labeled(path: &Path) -> MismatchResult<Vec<LabeledRow>> {
    let text = read_file(path)?;
    Ok(read_labeled(&text, &path.display().to_string())?)
}

pub fn save_rows(path: &Path, rows: &[AdjacencyRow]) -> MismatchResult<()> {
    write_file(path, &write_rows(rows))
}

pub fn save_labeled(path: &Path, rows: &[LabeledRow]) -> MismatchResult<()> {
    write_file(path, &write_labeled(rows))
}
