//! Lenient parser for pasted animal tables.
//!
//! Accepts tab-separated, 2+-space-separated, or single-spaced rows of
//! `AnimalID | Tag | Sex | Genotype | Cage`. Single-spaced rows are
//! anchored at the Sex token so tags and genotypes may contain spaces.

use crate::animal::Animal;
use regex::Regex;

const SEX_TOKENS: [&str; 2] = ["Male", "Female"];

/// Parse pasted spreadsheet text into a roster. Header lines, short
/// lines and rows without a recognizable Sex token are skipped; the
/// structural validation of the resulting roster happens in the
/// scheduler, not here.
pub fn parse_roster_text(text: &str) -> Vec<Animal> {
    let multi_space = Regex::new(r"\s{2,}").expect("hard-coded pattern");
    let mut animals = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains("AnimalID") && line.contains("Sex") {
            continue;
        }
        if let Some(animal) = parse_line(line, &multi_space) {
            animals.push(animal);
        }
    }
    animals
}

fn parse_line(line: &str, multi_space: &Regex) -> Option<Animal> {
    let columns: Vec<&str> = if line.contains('\t') {
        line.split('\t').map(str::trim).filter(|c| !c.is_empty()).collect()
    } else {
        multi_space
            .split(line)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect()
    };

    // Clean 5+ column rows map positionally; everything between Sex and
    // the trailing Cage is the genotype.
    if columns.len() >= 5 && SEX_TOKENS.contains(&columns[2]) {
        let last = columns.len() - 1;
        return build_animal(
            columns[0],
            columns[1],
            columns[2],
            &columns[3..last].join(" "),
            columns[last],
        );
    }

    // Fallback for single-spaced rows: anchor on the Sex token.
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return None;
    }
    let sex_idx = tokens.iter().position(|t| SEX_TOKENS.contains(t))?;
    if sex_idx < 1 || tokens.len() < sex_idx + 2 {
        return None;
    }
    build_animal(
        tokens[0],
        &tokens[1..sex_idx].join(" "),
        tokens[sex_idx],
        &tokens[sex_idx + 1..tokens.len() - 1].join(" "),
        tokens[tokens.len() - 1],
    )
}

fn build_animal(id: &str, tag: &str, sex: &str, genotype: &str, cage: &str) -> Option<Animal> {
    let animal = Animal {
        animal_id: normalize_hyphens(id),
        tag: normalize_hyphens(tag),
        sex: normalize_hyphens(sex),
        genotype: normalize_hyphens(genotype),
        cage: normalize_hyphens(cage),
    };
    if animal.animal_id.is_empty() || animal.genotype.is_empty() || animal.cage.is_empty() {
        return None;
    }
    Some(animal)
}

/// Spreadsheets paste non-breaking hyphens, en/em dashes and minus signs
/// where IDs contain plain hyphens.
fn normalize_hyphens(s: &str) -> String {
    s.replace(['\u{2011}', '\u{2013}', '\u{2014}', '\u{2212}'], "-")
        .trim()
        .to_string()
}
