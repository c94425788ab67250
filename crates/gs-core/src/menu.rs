//! Persona/menu reference table
//!
//! The venue's menu sheet maps persona types to a recommended drink and
//! food. It is exported as CSV with a few header rows and the useful data in
//! fixed columns; rows without a numeric type in column 8 are skipped.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::order::MAX_TYPE_NUMBER;

const COL_NUMBER: usize = 8;
const COL_NAME: usize = 10;
const COL_DESCRIPTION: usize = 11;
const COL_DRINK: usize = 12;
const COL_FOOD: usize = 13;
const COL_KEYWORDS: usize = 14;

/// One persona type row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaType {
    pub number: u8,
    pub name: String,
    pub description: String,
    pub drink: String,
    pub food: String,
    pub keywords: String,
}

/// Reference data handed to the extractor prompt
#[derive(Debug, Clone, Default)]
pub struct MenuReference {
    types: Vec<PersonaType>,
}

impl MenuReference {
    pub fn new(types: Vec<PersonaType>) -> Self {
        Self { types }
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Menu(format!("Failed to open {}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut types = Vec::new();

        for record in csv.records() {
            let record = record.map_err(|e| Error::Menu(format!("Invalid CSV: {}", e)))?;

            if record.len() <= COL_KEYWORDS {
                continue;
            }

            let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();

            let Ok(number) = cell(COL_NUMBER).parse::<u8>() else {
                continue;
            };
            if number == 0 || number > MAX_TYPE_NUMBER {
                continue;
            }

            let name = cell(COL_NAME);
            if name.is_empty() || name == "nan" {
                continue;
            }

            types.push(PersonaType {
                number,
                name,
                description: cell(COL_DESCRIPTION),
                drink: cell(COL_DRINK),
                food: cell(COL_FOOD),
                keywords: cell(COL_KEYWORDS),
            });
        }

        if types.is_empty() {
            return Err(Error::Menu("No persona rows found".to_string()));
        }

        debug!("Loaded {} persona types", types.len());
        Ok(Self { types })
    }

    pub fn types(&self) -> &[PersonaType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, number: u8) -> Option<&PersonaType> {
        self.types.iter().find(|t| t.number == number)
    }

    /// Case-insensitive lookup by persona name
    pub fn find_by_name(&self, name: &str) -> Option<&PersonaType> {
        let name = name.trim();
        self.types.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Plain-text table for the extraction prompt
    pub fn to_prompt_table(&self) -> String {
        self.types
            .iter()
            .map(|t| {
                format!(
                    "{} | {} | {} | {} | {} | {}",
                    t.number, t.name, t.description, t.drink, t.food, t.keywords
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
GML25,,,,,,,,,,,,,,
,,,,,,,,번호,색상,타입명,타입 설명,음료,푸드,성향 키워드
,,,,,,,,1,red,Bold Creator,\"남다른 시도로, 새로운 가치를 만드는 마케터.\",Negroni,코랄 소스의 랍스터 테일,#도전 #전략적 #리더십
,,,,,,,,2,blue,Unexpected Innovator,틀을 깨는 아이디어,Negroni,파가든 브리오쉬 한우 버거,#열정 #변주
,,,,,,,,30,gray,Out Of Range,x,x,x,x
,,,,,,,,4,green,,missing name,x,x,x
short,row
,,,,,,,,8,pink,Cozy Connector,일상의 작은 행복,Fuzzy Navel,고르곤졸라 피자,#조화 #섬세함
";

    #[test]
    fn test_parse_sheet_skips_headers_and_invalid_rows() {
        let menu = MenuReference::from_reader(SHEET.as_bytes()).unwrap();
        let numbers: Vec<u8> = menu.types().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 2, 8]);
    }

    #[test]
    fn test_quoted_description_keeps_commas() {
        let menu = MenuReference::from_reader(SHEET.as_bytes()).unwrap();
        let bold = menu.get(1).unwrap();
        assert_eq!(bold.name, "Bold Creator");
        assert_eq!(bold.description, "남다른 시도로, 새로운 가치를 만드는 마케터.");
        assert_eq!(bold.drink, "Negroni");
    }

    #[test]
    fn test_find_by_name() {
        let menu = MenuReference::from_reader(SHEET.as_bytes()).unwrap();
        assert_eq!(menu.find_by_name("cozy connector").unwrap().number, 8);
        assert!(menu.find_by_name("Future Seeker").is_none());
    }

    #[test]
    fn test_prompt_table_has_one_line_per_type() {
        let menu = MenuReference::from_reader(SHEET.as_bytes()).unwrap();
        let table = menu.to_prompt_table();
        assert_eq!(table.lines().count(), 3);
        assert!(table.starts_with("1 | Bold Creator"));
    }

    #[test]
    fn test_sheet_without_rows_is_error() {
        assert!(MenuReference::from_reader("a,b,c\n".as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(matches!(
            MenuReference::from_csv_path("/nonexistent/menu.csv"),
            Err(Error::Menu(_))
        ));
    }
}
