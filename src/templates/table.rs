use crate::utils::error::{EpdIfcError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const BOM: char = '\u{feff}';

/// Non-empty cells of one CSV row, keyed by header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRow {
    fields: HashMap<String, String>,
}

impl TemplateRow {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Like `get`, but a missing field is an error that names `group`.
    pub fn require(&self, group: &str, field: &str) -> Result<&str> {
        self.get(field)
            .ok_or_else(|| EpdIfcError::MissingTemplateField {
                group: group.to_string(),
                field: field.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateGroup {
    pub name: String,
    /// Cells of the row that opened the group, minus the name cell.
    pub attributes: TemplateRow,
    pub members: Vec<TemplateRow>,
}

impl TemplateGroup {
    pub fn new(name: impl Into<String>, attributes: TemplateRow) -> Self {
        Self {
            name: name.into(),
            attributes,
            members: Vec::new(),
        }
    }

    pub fn attribute(&self, field: &str) -> Option<&str> {
        self.attributes.get(field)
    }
}

/// A grouped template sheet. The first CSV column names a group; rows with an
/// empty first cell belong to the group above them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateTable {
    source_name: String,
    groups: Vec<TemplateGroup>,
}

impl TemplateTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        Self::from_reader(path.display().to_string(), file)
    }

    pub fn from_reader<R: Read>(source_name: impl Into<String>, reader: R) -> Result<Self> {
        let source_name = source_name.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches(BOM) } else { h };
                h.trim().to_string()
            })
            .collect();

        if headers.is_empty() || headers[0].is_empty() {
            return Err(EpdIfcError::TemplateStructureError {
                source_name,
                message: "header row is missing the group name column".to_string(),
            });
        }

        let mut table = Self {
            source_name,
            groups: Vec::new(),
        };
        let mut current: Option<usize> = None;

        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            let group_name = record.get(0).map(str::trim).unwrap_or_default();
            let cells: TemplateRow = headers
                .iter()
                .zip(record.iter())
                .skip(1)
                .filter_map(|(header, value)| {
                    let value = value.trim();
                    (!value.is_empty()).then(|| (header.clone(), value.to_string()))
                })
                .collect();

            if !group_name.is_empty() {
                current = Some(table.start_group(group_name, cells));
                continue;
            }

            if cells.is_empty() {
                continue;
            }

            match current {
                Some(index) => table.groups[index].members.push(cells),
                None => {
                    return Err(EpdIfcError::TemplateStructureError {
                        source_name: table.source_name,
                        // +2: header row and 1-based numbering
                        message: format!("row {} has no group above it", line + 2),
                    })
                }
            }
        }

        tracing::debug!(
            "Loaded {} template groups from {}",
            table.groups.len(),
            table.source_name
        );
        Ok(table)
    }

    fn start_group(&mut self, name: &str, attributes: TemplateRow) -> usize {
        let group = TemplateGroup::new(name, attributes);
        match self.groups.iter().position(|g| g.name == name) {
            Some(index) => {
                tracing::warn!(
                    "Template group '{}' appears twice in {}; keeping the later one",
                    name,
                    self.source_name
                );
                self.groups[index] = group;
                index
            }
            None => {
                self.groups.push(group);
                self.groups.len() - 1
            }
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn group(&self, name: &str) -> Option<&TemplateGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &TemplateGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<TemplateTable> {
        TemplateTable::from_reader("test.csv", content.as_bytes())
    }

    #[test]
    fn test_groups_and_members() {
        let table = parse(
            "PropertySet,Description,PropertyName,DataType,IFCType\n\
             LCAPset_ProductInformation,Product data,,,\n\
             ,,ProductName,IfcLabel,IfcPropertySingleValue\n\
             ,,DeclaredUnit,IfcLabel,IfcPropertySingleValue\n\
             LCAPset_Empty,,,,\n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        let group = table.group("LCAPset_ProductInformation").unwrap();
        assert_eq!(group.attribute("Description"), Some("Product data"));
        assert_eq!(group.members.len(), 2);
        assert_eq!(group.members[1].get("PropertyName"), Some("DeclaredUnit"));
        assert!(!group.members[0].contains("Description"));

        let empty = table.group("LCAPset_Empty").unwrap();
        assert!(empty.attributes.is_empty());
        assert!(empty.members.is_empty());
    }

    #[test]
    fn test_bom_and_blank_rows_are_tolerated() {
        let table = parse(
            "\u{feff}Enumeration,DataType,EnumerationValues\n\
             PEnum_Unit,,\n\
             ,,\n\
             ,IfcLabel,kg\n",
        )
        .unwrap();

        let group = table.group("PEnum_Unit").unwrap();
        assert_eq!(group.members.len(), 1);
        assert_eq!(group.members[0].get("EnumerationValues"), Some("kg"));
    }

    #[test]
    fn test_member_before_group_is_rejected() {
        let err = parse("PropertySet,PropertyName\n,Orphan\n").unwrap_err();
        assert!(matches!(err, EpdIfcError::TemplateStructureError { .. }));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_repeated_group_keeps_position() {
        let table = parse(
            "Set,Field\n\
             A,first\n\
             B,\n\
             A,second\n\
             ,member\n",
        )
        .unwrap();

        let names: Vec<&str> = table.groups().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let a = table.group("A").unwrap();
        assert_eq!(a.attribute("Field"), Some("second"));
        assert_eq!(a.members.len(), 1);
    }

    #[test]
    fn test_from_path_uses_path_as_source_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("22057IFC_tablecolumns.csv");
        std::fs::write(&path, "Module,ISO22057GUID
A1,a1-guid
A2,a2-guid
").unwrap();

        let table = TemplateTable::from_path(&path).unwrap();
        assert!(table.source_name().ends_with("22057IFC_tablecolumns.csv"));
        assert_eq!(table.group("A2").unwrap().attribute("ISO22057GUID"), Some("a2-guid"));

        let missing = TemplateTable::from_path(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(missing, EpdIfcError::IoError(_)));
    }

    #[test]
    fn test_require_names_group_and_field() {
        let row: TemplateRow = [("PropertyName", "Mass")].into_iter().collect();
        let err = row.require("LCAPset_Physical", "DataType").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template group 'LCAPset_Physical' is missing field 'DataType'"
        );
    }
}
