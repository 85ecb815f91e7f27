//! Drug catalog operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{normalize_drug_name, Drug, DrugRecord};

impl Database {
    /// Add a drug to the catalog, returning its store-assigned id.
    pub fn insert_drug(&self, record: &DrugRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO drugs (name, brand, quantity, expiry_date, price_per_unit)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.name,
                record.brand,
                record.quantity,
                record.expiry_date,
                record.price_per_unit,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Resolve a drug name to its id, ignoring case and whitespace.
    ///
    /// Fails with `NotFound` when nothing matches and `AmbiguousName` when
    /// more than one drug normalizes to the same name.
    pub fn find_drug_id(&self, name: &str) -> DbResult<i64> {
        let wanted = normalize_drug_name(name);

        let mut stmt = self.conn.prepare("SELECT id, name FROM drugs ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut ids = Vec::new();
        for row in rows {
            let (id, drug_name) = row?;
            if normalize_drug_name(&drug_name) == wanted {
                ids.push(id);
            }
        }

        match ids.len() {
            0 => Err(DbError::NotFound(format!("Drug '{}'", name))),
            1 => Ok(ids[0]),
            _ => Err(DbError::AmbiguousName {
                name: name.to_string(),
                ids,
            }),
        }
    }

    /// Current stock for a drug id.
    pub fn get_stock(&self, drug_id: i64) -> DbResult<i64> {
        self.conn
            .query_row(
                "SELECT quantity FROM drugs WHERE id = ?",
                [drug_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("No quantity entry for drug ID {}", drug_id)))
    }

    /// Subtract `quantity` from a drug's stock.
    ///
    /// No floor is applied: the caller must have checked stock first, or the
    /// quantity goes negative. Returns whether a row was updated.
    pub fn decrement_stock(&self, drug_id: i64, quantity: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE drugs SET quantity = quantity - ?1 WHERE id = ?2",
            params![quantity, drug_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Inventory panel fields for one drug.
    pub fn get_drug_record(&self, drug_id: i64) -> DbResult<Option<DrugRecord>> {
        let drug = self
            .conn
            .query_row(
                r#"
                SELECT id, name, brand, quantity, expiry_date, price_per_unit
                FROM drugs
                WHERE id = ?
                "#,
                [drug_id],
                drug_from_row,
            )
            .optional()?;

        Ok(drug.map(DrugRecord::from))
    }

    /// Full drug rows, ordered by id.
    pub fn list_drugs(&self) -> DbResult<Vec<Drug>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, brand, quantity, expiry_date, price_per_unit
            FROM drugs
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], drug_from_row)?;

        let mut drugs = Vec::new();
        for row in rows {
            drugs.push(row?);
        }
        Ok(drugs)
    }

    /// Every drug as an inventory panel row, in insertion order.
    pub fn list_all_drugs(&self) -> DbResult<Vec<DrugRecord>> {
        Ok(self
            .list_drugs()?
            .into_iter()
            .map(DrugRecord::from)
            .collect())
    }
}

fn drug_from_row(row: &Row<'_>) -> rusqlite::Result<Drug> {
    Ok(Drug {
        id: row.get(0)?,
        name: row.get(1)?,
        brand: row.get(2)?,
        quantity: row.get(3)?,
        expiry_date: row.get(4)?,
        price_per_unit: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get_record() {
        let db = setup_db();
        let record = DrugRecord::new("Paracetamol", 10)
            .with_brand("Panadol")
            .with_expiry("2027-03-01")
            .with_price(0.5);

        let id = db.insert_drug(&record).unwrap();
        assert_eq!(db.get_drug_record(id).unwrap(), Some(record));
        assert_eq!(db.get_drug_record(id + 100).unwrap(), None);
    }

    #[test]
    fn test_find_drug_id_ignores_case_and_spaces() {
        let db = setup_db();
        let id = db.insert_drug(&DrugRecord::new("Paracetamol", 10)).unwrap();

        assert_eq!(db.find_drug_id("Paracetamol").unwrap(), id);
        assert_eq!(db.find_drug_id("paracetamol").unwrap(), id);
        assert_eq!(db.find_drug_id("Para cetamol").unwrap(), id);
        assert_eq!(db.find_drug_id(" PARACETAMOL ").unwrap(), id);
    }

    #[test]
    fn test_find_drug_id_not_found() {
        let db = setup_db();
        db.insert_drug(&DrugRecord::new("Paracetamol", 10)).unwrap();

        assert!(matches!(
            db.find_drug_id("Ibuprofen"),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_find_drug_id_ambiguous() {
        let db = setup_db();
        let a = db.insert_drug(&DrugRecord::new("Amoxicillin", 5)).unwrap();
        let b = db.insert_drug(&DrugRecord::new("Amoxi cillin", 8)).unwrap();

        match db.find_drug_id("amoxicillin") {
            Err(DbError::AmbiguousName { ids, .. }) => assert_eq!(ids, vec![a, b]),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_get_stock() {
        let db = setup_db();
        let id = db.insert_drug(&DrugRecord::new("Cetirizine", 30)).unwrap();

        assert_eq!(db.get_stock(id).unwrap(), 30);
        assert!(matches!(db.get_stock(id + 1), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_decrement_stock_has_no_floor() {
        let db = setup_db();
        let id = db.insert_drug(&DrugRecord::new("Cetirizine", 3)).unwrap();

        assert!(db.decrement_stock(id, 5).unwrap());
        assert_eq!(db.get_stock(id).unwrap(), -2);
        assert!(!db.decrement_stock(id + 1, 1).unwrap());
    }

    #[test]
    fn test_list_all_drugs_in_insertion_order() {
        let db = setup_db();
        db.insert_drug(&DrugRecord::new("Zinc", 1)).unwrap();
        db.insert_drug(&DrugRecord::new("Aspirin", 2)).unwrap();

        let names: Vec<String> = db
            .list_all_drugs()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Zinc", "Aspirin"]);
    }
}
