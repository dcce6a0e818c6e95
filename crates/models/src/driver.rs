use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "drivers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub driver_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub cnic: String,
    pub contact_number: Option<String>,
    pub license_expiry: Date,
    /// Written by the `trg_AutoUpdateDriverLicenseValidity` trigger only.
    pub license_validity: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trip::Entity")]
    Trip,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef { Relation::Trip.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, NotSet, QueryTrait, Set};

    #[test]
    fn insert_leaves_license_validity_to_the_store() {
        let am = ActiveModel {
            driver_id: NotSet,
            first_name: Set("Ayesha".into()),
            last_name: Set("Khan".into()),
            cnic: Set("35202-1234567-1".into()),
            contact_number: Set(Some("0300-1234567".into())),
            license_expiry: Set(chrono::NaiveDate::from_ymd_opt(2030, 1, 31).unwrap()),
            license_validity: NotSet,
        };
        let sql = Entity::insert(am).build(DbBackend::Postgres).to_string();
        assert!(sql.starts_with(r#"INSERT INTO "drivers""#), "{sql}");
        assert!(sql.contains("license_expiry"));
        assert!(!sql.contains("license_validity"), "{sql}");
    }
}
