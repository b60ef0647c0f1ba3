use serde::{Deserialize, Serialize};

pub type AnimalId = String;

/// Grouping key used to balance exit-arm assignment: (Genotype, Sex, Cage).
pub type Stratum = (String, String, String);

/// One roster entry. Sex, genotype and cage are opaque categorical labels;
/// the engine reads but never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    #[serde(rename = "AnimalID")]
    pub animal_id: AnimalId,
    #[serde(rename = "Tag")]
    pub tag: String,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Genotype")]
    pub genotype: String,
    #[serde(rename = "Cage")]
    pub cage: String,
}

impl Animal {
    pub fn stratum_key(&self) -> Stratum {
        (
            self.genotype.clone(),
            self.sex.clone(),
            self.cage.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stratum_key_groups_by_genotype_sex_cage() {
        let a = Animal {
            animal_id: "A1".to_string(),
            tag: "L".to_string(),
            sex: "Male".to_string(),
            genotype: "KO".to_string(),
            cage: "C1".to_string(),
        };
        let b = Animal {
            animal_id: "A2".to_string(),
            tag: "R".to_string(),
            sex: "Male".to_string(),
            genotype: "KO".to_string(),
            cage: "C1".to_string(),
        };
        let c = Animal {
            sex: "Female".to_string(),
            ..a.clone()
        };
        assert_eq!(a.stratum_key(), b.stratum_key());
        assert_ne!(a.stratum_key(), c.stratum_key());
    }

    #[test]
    fn test_deserializes_upstream_column_names() {
        let json = r#"{
            "AnimalID": "M-102",
            "Tag": "ear-left",
            "Sex": "Female",
            "Genotype": "IL-17 KO",
            "Cage": "Cage4"
        }"#;
        let animal: Animal = serde_json::from_str(json).unwrap();
        assert_eq!(animal.animal_id, "M-102");
        assert_eq!(animal.genotype, "IL-17 KO");
        assert_eq!(animal.cage, "Cage4");
    }
}
