//! Tables, field definitions and header-based column mapping.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three sheets backing the garden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Plants,
    Locations,
    Containers,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Plants, Table::Locations, Table::Containers];

    /// Name used in query bodies and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Table::Plants => "plants",
            Table::Locations => "locations",
            Table::Containers => "containers",
        }
    }

    /// Name of the worksheet holding this table.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Table::Plants => "Plants",
            Table::Locations => "Locations",
            Table::Containers => "Containers",
        }
    }

    pub fn fields(self) -> &'static [FieldDef] {
        match self {
            Table::Plants => PLANT_FIELDS,
            Table::Locations => LOCATION_FIELDS,
            Table::Containers => CONTAINER_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldDef> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Comma-separated list of valid field names, for error messages.
    pub fn field_names(self) -> String {
        self.fields()
            .iter()
            .map(|f| f.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn parse(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Header row written when a sheet has none yet.
    pub fn default_header(self) -> Vec<String> {
        self.fields().iter().map(|f| f.header.to_string()).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a field's cell text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    /// Comma-separated references.
    List,
}

/// A queryable field and the sheet header it lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    pub name: &'static str,
    pub header: &'static str,
    pub kind: FieldKind,
}

const fn def(name: &'static str, header: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, header, kind }
}

pub const PLANT_FIELDS: &[FieldDef] = &[
    def("plant_id", "Plant ID", FieldKind::Text),
    def("plant_name", "Plant Name", FieldKind::Text),
    def("description", "Description", FieldKind::Text),
    def("location_ids", "Location ID", FieldKind::List),
    def("light_requirements", "Light Requirements", FieldKind::Text),
    def("watering_needs", "Watering Needs", FieldKind::Text),
    def("care_notes", "Care Notes", FieldKind::Text),
    def("photo_url", "Photo URL", FieldKind::Text),
    def("last_updated", "Last Updated", FieldKind::Text),
];

pub const LOCATION_FIELDS: &[FieldDef] = &[
    def("location_id", "Location ID", FieldKind::Text),
    def("location_name", "Location Name", FieldKind::Text),
    def("morning_sun_hours", "Morning Sun Hours", FieldKind::Number),
    def("afternoon_sun_hours", "Afternoon Sun Hours", FieldKind::Number),
    def("evening_sun_hours", "Evening Sun Hours", FieldKind::Number),
    def("total_sun_hours", "Total Sun Hours", FieldKind::Number),
    def("microclimate_conditions", "Microclimate Conditions", FieldKind::Text),
];

pub const CONTAINER_FIELDS: &[FieldDef] = &[
    def("container_id", "Container ID", FieldKind::Text),
    def("plant_id", "Plant ID", FieldKind::Text),
    def("location_id", "Location ID", FieldKind::Text),
    def("container_type", "Container Type", FieldKind::Text),
    def("container_size", "Container Size", FieldKind::Text),
    def("container_material", "Container Material", FieldKind::Text),
];

/// A borrowed field value as seen by the query engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    List(&'a [String]),
}

impl<'a> FieldValue<'a> {
    /// Non-blank text, or `None`.
    pub fn text(value: &'a str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(FieldValue::Text(trimmed))
        }
    }

    pub fn number(value: Option<f64>) -> Option<Self> {
        value.map(FieldValue::Number)
    }

    pub fn list(values: &'a [String]) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(FieldValue::List(values))
        }
    }

    /// Numeric reading of the value; text is parsed leniently.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(t) => parse_number(t),
            FieldValue::List(_) => None,
        }
    }

    /// Textual reading of a scalar value.
    pub fn as_text(&self) -> Cow<'a, str> {
        match self {
            FieldValue::Text(t) => Cow::Borrowed(*t),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::List(items) => Cow::Owned(items.join(", ")),
        }
    }

    /// Scalar views of the value: each item for lists, itself otherwise.
    pub fn items(&self) -> Vec<FieldValue<'a>> {
        match self {
            FieldValue::List(items) => items.iter().map(|i| FieldValue::Text(i.as_str())).collect(),
            other => vec![other.clone()],
        }
    }
}

/// Parse a spreadsheet number cell. Blank or non-numeric cells are `None`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Split a comma-separated reference cell.
pub fn parse_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_number(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

/// A typed row of one of the garden tables.
pub trait Record: Serialize {
    const TABLE: Table;

    fn id(&self) -> &str;

    /// Field lookup by API name; blank fields are `None`.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    fn from_row(columns: &ColumnMap, row: &[String]) -> Self;

    /// Cell text for every field, keyed by API name.
    fn cells(&self) -> Vec<(&'static str, String)>;
}

/// Maps a sheet's header row onto field names.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    table: Table,
    width: usize,
    index: HashMap<&'static str, usize>,
}

impl ColumnMap {
    /// Header cells are matched case-insensitively against field headers
    /// and field names. Unknown columns are kept untouched on write.
    pub fn new(table: Table, header: &[String]) -> Self {
        let mut index = HashMap::new();
        for (col, cell) in header.iter().enumerate() {
            let cell = cell.trim();
            let found = table.fields().iter().find(|f| {
                f.header.eq_ignore_ascii_case(cell) || f.name.eq_ignore_ascii_case(cell)
            });
            if let Some(field) = found {
                index.entry(field.name).or_insert(col);
            }
        }
        Self {
            table,
            width: header.len(),
            index,
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn column(&self, field: &str) -> Option<usize> {
        self.index.get(field).copied()
    }

    /// Cell text for a field; missing columns and short rows read as blank.
    pub fn cell<'r>(&self, row: &'r [String], field: &str) -> &'r str {
        self.column(field)
            .and_then(|col| row.get(col))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// Write a record's cells over `base`, growing it to the header width.
    pub fn encode<R: Record>(&self, record: &R, mut base: Vec<String>) -> Vec<String> {
        if base.len() < self.width {
            base.resize(self.width, String::new());
        }
        for (field, value) in record.cells() {
            match self.column(field) {
                Some(col) => base[col] = value,
                None if !value.is_empty() => {
                    tracing::warn!(
                        table = %self.table,
                        field,
                        "Sheet has no column for field, value not stored"
                    );
                }
                None => {}
            }
        }
        base
    }

    /// True when a row carries no data at all.
    pub fn is_blank(row: &[String]) -> bool {
        row.iter().all(|c| c.trim().is_empty())
    }
}
