use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

/// Run each statement on its own so a failure names the offending object.
pub(crate) async fn run_all(manager: &SchemaManager<'_>, statements: &[&str]) -> Result<(), DbErr> {
    let conn = manager.get_connection();
    for stmt in statements {
        conn.execute_unprepared(stmt).await?;
    }
    Ok(())
}
