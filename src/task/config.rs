//! Static task definitions.
//!
//! The study runs a fixed list of ten tasks: five write tasks (complete a
//! selection expression for a highlighted region) followed by five read
//! tasks (highlight the region a given expression selects). Task 0 and task
//! 5 are unmeasured warm-ups written in pseudocode.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::path::Path;
use std::sync::Arc;

use super::language::{Language, LanguageSequence};
use super::table::Table;
use crate::grid::{Cell, CellRange};
use crate::{sxlog_debug, Error, Result};

const WRITE_TABLE_FILE: &str = "syntax-data1.csv";
const READ_TABLE_FILE: &str = "syntax-data2.csv";

const WRITE_TABLE: &str = include_str!("../../data/syntax-data1.csv");
const READ_TABLE: &str = include_str!("../../data/syntax-data2.csv");

const WRITE_HEADER: [&str; 11] = [
    "mpg", "cyl", "disp", "hp", "drat", "wt", "qsec", "vs", "am", "gear", "carb",
];
const READ_HEADER: [&str; 10] = [
    "name", "mpg", "cyl", "disp", "hp", "drat", "wt", "qsec", "vs", "am",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskKind {
    #[serde(rename = "SYNTAX_READ")]
    Read,
    #[serde(rename = "SYNTAX_WRITE")]
    Write,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Read => "SYNTAX_READ",
            TaskKind::Write => "SYNTAX_WRITE",
        }
    }
}

/// A value for each language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerLanguage<T> {
    pub jv: T,
    pub py: T,
}

impl<T> PerLanguage<T> {
    pub fn get(&self, language: Language) -> &T {
        match language {
            Language::Jv => &self.jv,
            Language::Py => &self.py,
        }
    }
}

impl<T: Clone> PerLanguage<T> {
    pub fn same(value: T) -> Self {
        Self {
            jv: value.clone(),
            py: value,
        }
    }
}

/// Code around the single line the participant completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTemplate {
    pub code_before: String,
    pub line_before: String,
    pub line_after: String,
    pub code_after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadTask {
    pub code: PerLanguage<String>,
    /// Region the code selects. Only the offline report reads this; the
    /// participant never sees it. `None` for the warm-up.
    #[serde(skip)]
    pub expected: Option<CellRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteTask {
    pub template: PerLanguage<CodeTemplate>,
    pub target: CellRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPayload {
    Read(ReadTask),
    Write(WriteTask),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConfig {
    pub table: Arc<Table>,
    pub payload: TaskPayload,
}

impl TaskConfig {
    pub fn read(table: Arc<Table>, code: PerLanguage<String>, expected: Option<CellRange>) -> Self {
        Self {
            table,
            payload: TaskPayload::Read(ReadTask { code, expected }),
        }
    }

    pub fn write(table: Arc<Table>, template: PerLanguage<CodeTemplate>, target: CellRange) -> Self {
        Self {
            table,
            payload: TaskPayload::Write(WriteTask { template, target }),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self.payload {
            TaskPayload::Read(_) => TaskKind::Read,
            TaskPayload::Write(_) => TaskKind::Write,
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        let (rows, cols) = (self.table.row_count(), self.table.col_count());
        let range = match &self.payload {
            TaskPayload::Write(write) => Some(write.target),
            TaskPayload::Read(read) => read.expected,
        };
        match range {
            Some(range) if !range.fits(rows, cols) => Err(Error::InvalidRange(format!(
                "{range} in task {index} exceeds {rows}x{cols} table '{}'",
                self.table.name()
            ))),
            _ => Ok(()),
        }
    }
}

// Events carry the config in the shape the analysis scripts expect:
// `{ "type": .., "data": { "jv": .., "py": .., "tableData": .., ... } }`.
impl Serialize for TaskConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TaskConfig", 2)?;
        state.serialize_field("type", &self.kind())?;
        state.serialize_field("data", &ConfigData(self))?;
        state.end()
    }
}

struct ConfigData<'a>(&'a TaskConfig);

impl Serialize for ConfigData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let config = self.0;
        match &config.payload {
            TaskPayload::Read(read) => {
                let mut state = serializer.serialize_struct("ReadData", 3)?;
                state.serialize_field("jv", &CodeOnly { code: &read.code.jv })?;
                state.serialize_field("py", &CodeOnly { code: &read.code.py })?;
                state.serialize_field("tableData", config.table.rows())?;
                state.end()
            }
            TaskPayload::Write(write) => {
                let mut state = serializer.serialize_struct("WriteData", 5)?;
                state.serialize_field("jv", &Surrounding { surrounding_code: &write.template.jv })?;
                state.serialize_field("py", &Surrounding { surrounding_code: &write.template.py })?;
                state.serialize_field("tableData", config.table.rows())?;
                state.serialize_field("highlightStart", &<[usize; 2]>::from(write.target.start()))?;
                state.serialize_field("highlightEnd", &<[usize; 2]>::from(write.target.end()))?;
                state.end()
            }
        }
    }
}

#[derive(Serialize)]
struct CodeOnly<'a> {
    code: &'a str,
}

#[derive(Serialize)]
struct Surrounding<'a> {
    #[serde(rename = "surroundingCode")]
    surrounding_code: &'a CodeTemplate,
}

/// The ordered, immutable task list.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    configs: Vec<TaskConfig>,
}

impl TaskCatalog {
    /// The study's tasks over the bundled tables.
    pub fn builtin() -> Result<Self> {
        let write_table = Table::parse("syntax-data1", &WRITE_HEADER, WRITE_TABLE)?;
        let read_table = Table::parse("syntax-data2", &READ_HEADER, READ_TABLE)?;
        Self::study(write_table, read_table)
    }

    /// The study's tasks over tables loaded from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        sxlog_debug!("TaskCatalog::from_dir {}", dir.display());
        let write_table = Table::load(&dir.join(WRITE_TABLE_FILE), &WRITE_HEADER)?;
        let read_table = Table::load(&dir.join(READ_TABLE_FILE), &READ_HEADER)?;
        Self::study(write_table, read_table)
    }

    pub fn from_configs(configs: Vec<TaskConfig>) -> Result<Self> {
        for (index, config) in configs.iter().enumerate() {
            config.validate(index)?;
        }
        Ok(Self { configs })
    }

    fn study(write_table: Table, read_table: Table) -> Result<Self> {
        let write_table = Arc::new(write_table);
        let read_table = Arc::new(read_table);

        let write = |start: (usize, usize), end: (usize, usize), template: PerLanguage<CodeTemplate>| {
            Ok::<_, Error>(TaskConfig::write(
                write_table.clone(),
                template,
                CellRange::new(Cell::new(start.0, start.1), Cell::new(end.0, end.1))?,
            ))
        };
        let read = |jv: &str, py: &str, expected: ((usize, usize), (usize, usize))| {
            let ((r0, c0), (r1, c1)) = expected;
            Ok::<_, Error>(TaskConfig::read(
                read_table.clone(),
                PerLanguage {
                    jv: read_code_jv(jv),
                    py: read_code_py(py),
                },
                Some(CellRange::new(Cell::new(r0, c0), Cell::new(r1, c1))?),
            ))
        };

        let configs = vec![
            write((3, 3), (5, 5), PerLanguage::same(example_template()))?,
            write((1, 0), (3, 10), language_templates())?,
            write((0, 0), (4, 3), language_templates())?,
            write((0, 4), (9, 7), language_templates())?,
            write((3, 3), (8, 7), language_templates())?,
            TaskConfig::read(read_table.clone(), PerLanguage::same(read_code_example()), None),
            read("A4:*5", "3:5, :", ((3, 0), (4, 9)))?,
            read("A7:C10", "6:10, 0:3", ((6, 0), (9, 2)))?,
            read("C1:E*", ":, 2:5", ((0, 2), (9, 4)))?,
            read("E5:I8", "4:8, 4:9", ((4, 4), (7, 8)))?,
        ];
        Self::from_configs(configs)
    }

    pub fn configs(&self) -> &[TaskConfig] {
        &self.configs
    }

    pub fn get(&self, index: usize) -> Option<&TaskConfig> {
        self.configs.get(index)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Startup check that every task has a language assigned.
    pub fn check_sequence(&self, sequence: &LanguageSequence) -> Result<()> {
        if sequence.len() != self.configs.len() {
            return Err(Error::SequenceLength {
                expected: self.configs.len(),
                found: sequence.len(),
            });
        }
        Ok(())
    }
}

fn language_templates() -> PerLanguage<CodeTemplate> {
    PerLanguage {
        jv: CodeTemplate {
            code_before: "// Jayvee code\n// Other blocks and pipeline definition...\n\nblock DataSelector oftype CellRangeSelector {".to_string(),
            line_before: "  select: range ".to_string(),
            line_after: ";".to_string(),
            code_after: "}".to_string(),
        },
        py: CodeTemplate {
            code_before: "# Python code\n# Imports and pipeline definition...\n\ndf = pd.read_csv('./data.csv')".to_string(),
            line_before: "df.iloc[".to_string(),
            line_after: "]".to_string(),
            code_after: String::new(),
        },
    }
}

fn example_template() -> CodeTemplate {
    CodeTemplate {
        code_before: "// This is an example task\n// This task is not measured\n\n// Please familiarize yourself with the environment\n// The upcoming tasks will ask you to complete code to select cells\n".to_string(),
        line_before: "complete with any pseudocode: [".to_string(),
        line_after: "]".to_string(),
        code_after: String::new(),
    }
}

fn read_code_jv(range: &str) -> String {
    format!(
        "// Jayvee code\n// Other blocks and pipeline definition...\n\nblock DataSelector oftype CellRangeSelector {{\n  select: range {range};\n}}"
    )
}

fn read_code_py(range: &str) -> String {
    format!(
        "# Python code\n# Imports and pipeline definition...\n\ndf = pd.read_csv('./data.csv')\n\ndf.iloc[{range}]"
    )
}

fn read_code_example() -> String {
    "// This is an example task\n// This task is not measured\n\n// Please familiarize yourself with the environment\n// The upcoming tasks will ask you to select cells with your mouse\n// depending on the code you are shown\n\n// Please select some cells and submit".to_string()
}
