//! Sales ledger operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::Sale;

/// Today's local calendar date as stored in `sales.sale_date`.
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

impl Database {
    /// Append a sale dated today. Stock is not checked or touched.
    pub fn record_sale(&self, drug_id: i64, quantity: i64) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO sales (drug_id, quantity_sold, sale_date) VALUES (?1, ?2, ?3)",
            params![drug_id, quantity, today()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Record a sale and decrement stock in a single transaction.
    ///
    /// The decrement only applies while stock covers `quantity`; otherwise
    /// nothing is written and `InsufficientStock` is returned.
    pub fn commit_sale(&self, drug_id: i64, quantity: i64) -> DbResult<Sale> {
        if quantity <= 0 {
            return Err(DbError::Constraint(format!(
                "sale quantity must be positive, got {}",
                quantity
            )));
        }

        let tx = self.conn.unchecked_transaction()?;

        let updated = tx.execute(
            "UPDATE drugs SET quantity = quantity - ?1 WHERE id = ?2 AND quantity >= ?1",
            params![quantity, drug_id],
        )?;

        if updated == 0 {
            let available: Option<i64> = tx
                .query_row(
                    "SELECT quantity FROM drugs WHERE id = ?",
                    [drug_id],
                    |row| row.get(0),
                )
                .optional()?;

            return match available {
                None => Err(DbError::NotFound(format!("Drug ID {}", drug_id))),
                Some(available) => Err(DbError::InsufficientStock {
                    drug_id,
                    requested: quantity,
                    available,
                }),
            };
        }

        let sale_date = today();
        tx.execute(
            "INSERT INTO sales (drug_id, quantity_sold, sale_date) VALUES (?1, ?2, ?3)",
            params![drug_id, quantity, sale_date],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Sale {
            id,
            drug_id,
            quantity_sold: quantity,
            sale_date,
        })
    }

    /// The full sales ledger, oldest first.
    pub fn list_sales(&self) -> DbResult<Vec<Sale>> {
        let mut stmt = self.conn.prepare(
            "SELECT rowid, drug_id, quantity_sold, sale_date FROM sales ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Sale {
                id: row.get(0)?,
                drug_id: row.get(1)?,
                quantity_sold: row.get(2)?,
                sale_date: row.get(3)?,
            })
        })?;

        let mut sales = Vec::new();
        for row in rows {
            sales.push(row?);
        }
        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrugRecord;

    fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_drug(&DrugRecord::new("Paracetamol", 10)).unwrap();
        (db, id)
    }

    #[test]
    fn test_record_sale_leaves_stock() {
        let (db, id) = setup_db();

        db.record_sale(id, 4).unwrap();

        let sales = db.list_sales().unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].drug_id, id);
        assert_eq!(sales[0].quantity_sold, 4);
        assert_eq!(sales[0].sale_date, today());
        assert_eq!(db.get_stock(id).unwrap(), 10);
    }

    #[test]
    fn test_record_sale_unknown_drug_rejected() {
        let (db, id) = setup_db();
        assert!(db.record_sale(id + 1, 1).is_err());
    }

    #[test]
    fn test_commit_sale() {
        let (db, id) = setup_db();

        let sale = db.commit_sale(id, 10).unwrap();
        assert_eq!(sale.quantity_sold, 10);
        assert_eq!(db.get_stock(id).unwrap(), 0);
        assert_eq!(db.list_sales().unwrap(), vec![sale]);
    }

    #[test]
    fn test_commit_sale_insufficient_writes_nothing() {
        let (db, id) = setup_db();

        match db.commit_sale(id, 11) {
            Err(DbError::InsufficientStock {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 11);
                assert_eq!(available, 10);
            }
            other => panic!("expected insufficient stock, got {:?}", other),
        }
        assert_eq!(db.get_stock(id).unwrap(), 10);
        assert!(db.list_sales().unwrap().is_empty());
    }

    #[test]
    fn test_commit_sale_rejects_non_positive() {
        let (db, id) = setup_db();
        assert!(matches!(db.commit_sale(id, 0), Err(DbError::Constraint(_))));
        assert!(matches!(db.commit_sale(id, -3), Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_commit_sale_unknown_drug() {
        let (db, id) = setup_db();
        assert!(matches!(db.commit_sale(id + 7, 1), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_sales_are_append_only() {
        let (db, id) = setup_db();
        db.commit_sale(id, 1).unwrap();

        assert!(db.conn().execute("DELETE FROM sales", []).is_err());
        assert!(db
            .conn()
            .execute("UPDATE sales SET quantity_sold = 5", [])
            .is_err());
        assert_eq!(db.list_sales().unwrap().len(), 1);
    }
}
