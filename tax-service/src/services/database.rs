//! Database service for tax-service.

use crate::models::{
    AddressChanges, AddressFields, Document, DocumentKind, DocumentLine, Invoice,
    NewApiTransaction, NewTaxDetail, Partner, PsCode, SalesOrder, TaxCode, TaxDetail,
    TaxableDocument,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::store::TaxStore;
use async_trait::async_trait;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = "document_id, kind, name, state, document_date, untaxed_total, \
     tax_total, partner_id, company_partner_id, tax_annotation, created_utc";

const LINE_COLUMNS: &str = "line_id, document_id, line_ref, ps_code, category_ps_code, quantity, \
     ordered_quantity, price_subtotal, tax_amount, tax_response, sort_order, created_utc";

const PARTNER_COLUMNS: &str = "partner_id, name, street, street2, city, state_code, country_code, \
     zip, latitude, longitude, pluscode, last_validation, created_utc";

const TAX_DETAIL_COLUMNS: &str = "tax_detail_id, line_id, description, tax_authority, tax_level, \
     tax_type, tax_class, rate, calc_base, total_tax, taxable, geocode, exempt_amount, \
     percent_taxable, non_taxable_amount, payload, created_utc, updated_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "tax-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Document Operations
    // -------------------------------------------------------------------------

    /// Get a document header by ID.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn get_document(&self, document_id: Uuid) -> Result<Option<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_document"])
            .start_timer();

        let document = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE document_id = $1"
        ))
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get document: {}", e)))?;

        timer.observe_duration();

        Ok(document)
    }

    /// Get a document's lines ordered by position.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn get_document_lines(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<DocumentLine>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_document_lines"])
            .start_timer();

        let lines = sqlx::query_as::<_, DocumentLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM document_lines WHERE document_id = $1 \
             ORDER BY sort_order, created_utc"
        ))
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get document lines: {}", e))
        })?;

        timer.observe_duration();

        Ok(lines)
    }

    /// Load a document with its lines and addresses as the kind-specific
    /// taxable view.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn load_taxable_document(
        &self,
        document_id: Uuid,
    ) -> Result<Box<dyn TaxableDocument>, AppError> {
        let document = self
            .get_document(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Document not found")))?;

        let lines = self.get_document_lines(document_id).await?;

        let company = self
            .get_partner(document.company_partner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Company partner not found")))?;
        let ship_from = AddressFields::from(&company);

        let ship_to = self
            .get_partner(document.partner_id)
            .await?
            .map(|p| AddressFields::from(&p));

        let kind = DocumentKind::from_string(&document.kind);
        let taxable: Box<dyn TaxableDocument> = match kind {
            DocumentKind::Invoice => Box::new(Invoice {
                document,
                ship_from,
                ship_to,
                lines,
            }),
            DocumentKind::SaleOrder => Box::new(SalesOrder {
                document,
                ship_from,
                ship_to,
                lines,
            }),
        };
        Ok(taxable)
    }

    /// Move a document to a new lifecycle state.
    #[instrument(skip(self), fields(document_id = %document_id, state = %state))]
    pub async fn set_document_state(
        &self,
        document_id: Uuid,
        state: &str,
    ) -> Result<Option<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["set_document_state"])
            .start_timer();

        let document = sqlx::query_as::<_, Document>(&format!(
            "UPDATE documents SET state = $2 WHERE document_id = $1 \
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(document_id)
        .bind(state)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to set document state: {}", e))
        })?;

        timer.observe_duration();

        if let Some(ref doc) = document {
            info!(document = %doc.name, state = %doc.state, "Document state changed");
        }

        Ok(document)
    }
}

#[async_trait]
impl TaxStore for Database {
    async fn find_tax_detail(
        &self,
        line_id: Uuid,
        description: &str,
        rate: Decimal,
        total_tax: Decimal,
    ) -> Result<Option<TaxDetail>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_tax_detail"])
            .start_timer();

        let detail = sqlx::query_as::<_, TaxDetail>(&format!(
            "SELECT {TAX_DETAIL_COLUMNS} FROM tax_details \
             WHERE line_id = $1 AND description = $2 AND rate = $3 AND total_tax = $4"
        ))
        .bind(line_id)
        .bind(description)
        .bind(rate)
        .bind(total_tax)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to find tax detail: {}", e)))?;

        timer.observe_duration();

        Ok(detail)
    }

    async fn insert_tax_detail(&self, input: &NewTaxDetail) -> Result<TaxDetail, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_tax_detail"])
            .start_timer();

        let tax_detail_id = Uuid::new_v4();
        let detail = sqlx::query_as::<_, TaxDetail>(&format!(
            "INSERT INTO tax_details ( \
                tax_detail_id, line_id, description, tax_authority, tax_level, tax_type, \
                tax_class, rate, calc_base, total_tax, taxable, geocode, exempt_amount, \
                percent_taxable, non_taxable_amount, payload \
            ) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
            RETURNING {TAX_DETAIL_COLUMNS}"
        ))
        .bind(tax_detail_id)
        .bind(input.line_id)
        .bind(&input.description)
        .bind(&input.tax_authority)
        .bind(&input.tax_level)
        .bind(&input.tax_type)
        .bind(&input.tax_class)
        .bind(input.rate)
        .bind(input.calc_base)
        .bind(input.total_tax)
        .bind(&input.taxable)
        .bind(&input.geocode)
        .bind(&input.exempt_amount)
        .bind(&input.percent_taxable)
        .bind(&input.non_taxable_amount)
        .bind(&input.payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert tax detail: {}", e))
        })?;

        timer.observe_duration();

        Ok(detail)
    }

    async fn update_tax_detail(
        &self,
        tax_detail_id: Uuid,
        input: &NewTaxDetail,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_tax_detail"])
            .start_timer();

        sqlx::query(
            r#"
            UPDATE tax_details
            SET tax_authority = $2,
                tax_level = $3,
                tax_type = $4,
                tax_class = $5,
                calc_base = $6,
                taxable = $7,
                geocode = $8,
                exempt_amount = $9,
                percent_taxable = $10,
                non_taxable_amount = $11,
                payload = $12,
                updated_utc = NOW()
            WHERE tax_detail_id = $1
            "#,
        )
        .bind(tax_detail_id)
        .bind(&input.tax_authority)
        .bind(&input.tax_level)
        .bind(&input.tax_type)
        .bind(&input.tax_class)
        .bind(input.calc_base)
        .bind(&input.taxable)
        .bind(&input.geocode)
        .bind(&input.exempt_amount)
        .bind(&input.percent_taxable)
        .bind(&input.non_taxable_amount)
        .bind(&input.payload)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update tax detail: {}", e))
        })?;

        timer.observe_duration();

        Ok(())
    }

    async fn find_tax_code_by_name(&self, name: &str) -> Result<Option<TaxCode>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_tax_code_by_name"])
            .start_timer();

        let code = sqlx::query_as::<_, TaxCode>(
            "SELECT tax_code_id, name, rate, created_utc FROM tax_codes WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to find tax code: {}", e)))?;

        timer.observe_duration();

        Ok(code)
    }

    async fn tax_codes_with_base_name(&self, base: &str) -> Result<Vec<TaxCode>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["tax_codes_with_base_name"])
            .start_timer();

        let codes = sqlx::query_as::<_, TaxCode>(
            "SELECT tax_code_id, name, rate, created_utc FROM tax_codes \
             WHERE name = $1 OR name LIKE $1 || '\\_%' ORDER BY name",
        )
        .bind(base)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list tax codes: {}", e)))?;

        timer.observe_duration();

        Ok(codes)
    }

    async fn insert_tax_code(&self, name: &str, rate: Decimal) -> Result<TaxCode, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_tax_code"])
            .start_timer();

        let tax_code_id = Uuid::new_v4();
        let code = sqlx::query_as::<_, TaxCode>(
            r#"
            INSERT INTO tax_codes (tax_code_id, name, rate)
            VALUES ($1, $2, $3)
            RETURNING tax_code_id, name, rate, created_utc
            "#,
        )
        .bind(tax_code_id)
        .bind(name)
        .bind(rate)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Tax code '{}' already exists", name))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to insert tax code: {}", e)),
        })?;

        timer.observe_duration();

        info!(name = %code.name, rate = %code.rate, "Tax code created");

        Ok(code)
    }

    async fn save_line_refs(&self, refs: &[(Uuid, String)]) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["save_line_refs"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;
        for (line_id, line_ref) in refs {
            sqlx::query("UPDATE document_lines SET line_ref = $2 WHERE line_id = $1")
                .bind(line_id)
                .bind(line_ref)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to save line ref: {}", e))
                })?;
        }
        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit line refs: {}", e))
        })?;

        timer.observe_duration();

        Ok(())
    }

    async fn record_line_tax(
        &self,
        line_id: Uuid,
        tax_amount: Decimal,
        raw: &str,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_line_tax"])
            .start_timer();

        sqlx::query(
            "UPDATE document_lines SET tax_amount = $2, tax_response = $3 WHERE line_id = $1",
        )
        .bind(line_id)
        .bind(tax_amount)
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to record line tax: {}", e)))?;

        timer.observe_duration();

        Ok(())
    }

    async fn replace_line_tax_codes(
        &self,
        line_id: Uuid,
        tax_code_ids: &[Uuid],
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["replace_line_tax_codes"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;
        sqlx::query("DELETE FROM line_tax_codes WHERE line_id = $1")
            .bind(line_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to clear line tax codes: {}", e))
            })?;
        for tax_code_id in tax_code_ids {
            sqlx::query("INSERT INTO line_tax_codes (line_id, tax_code_id) VALUES ($1, $2)")
                .bind(line_id)
                .bind(tax_code_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to link tax code: {}", e))
                })?;
        }
        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit line tax codes: {}", e))
        })?;

        timer.observe_duration();

        Ok(())
    }

    async fn recompute_document(&self, document_id: Uuid) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["recompute_document"])
            .start_timer();

        sqlx::query(
            r#"
            UPDATE documents
            SET tax_total = (
                SELECT COALESCE(SUM(tax_amount), 0)
                FROM document_lines
                WHERE document_id = $1
            )
            WHERE document_id = $1
            "#,
        )
        .bind(document_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to recompute document: {}", e))
        })?;

        timer.observe_duration();

        Ok(())
    }

    async fn annotate_document(&self, document_id: Uuid, note: &str) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["annotate_document"])
            .start_timer();

        sqlx::query("UPDATE documents SET tax_annotation = $2 WHERE document_id = $1")
            .bind(document_id)
            .bind(note)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to annotate document: {}", e))
            })?;

        timer.observe_duration();

        Ok(())
    }

    async fn log_transaction(&self, input: &NewApiTransaction) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["log_transaction"])
            .start_timer();

        let transaction_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO api_transactions (
                transaction_id, name, endpoint, request_headers, request_body,
                status_code, response_body, document_id, line_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(transaction_id)
        .bind(&input.name)
        .bind(&input.endpoint)
        .bind(&input.request_headers)
        .bind(&input.request_body)
        .bind(input.status_code)
        .bind(&input.response_body)
        .bind(input.document_id)
        .bind(input.line_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to log transaction: {}", e))
        })?;

        timer.observe_duration();

        Ok(())
    }

    async fn recent_transaction_responses(&self, limit: i64) -> Result<Vec<String>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["recent_transaction_responses"])
            .start_timer();

        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT response_body
            FROM api_transactions
            WHERE response_body IS NOT NULL
            ORDER BY created_utc DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list transaction responses: {}", e))
        })?;

        timer.observe_duration();

        Ok(bodies)
    }

    async fn get_partner(&self, partner_id: Uuid) -> Result<Option<Partner>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_partner"])
            .start_timer();

        let partner = sqlx::query_as::<_, Partner>(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE partner_id = $1"
        ))
        .bind(partner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get partner: {}", e)))?;

        timer.observe_duration();

        Ok(partner)
    }

    async fn save_partner_validation(&self, partner_id: Uuid, raw: &str) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["save_partner_validation"])
            .start_timer();

        sqlx::query("UPDATE partners SET last_validation = $2 WHERE partner_id = $1")
            .bind(partner_id)
            .bind(raw)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to save validation result: {}", e))
            })?;

        timer.observe_duration();

        Ok(())
    }

    async fn apply_address_changes(
        &self,
        partner_id: Uuid,
        changes: &AddressChanges,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["apply_address_changes"])
            .start_timer();

        sqlx::query(
            r#"
            UPDATE partners
            SET street = COALESCE($2, street),
                street2 = COALESCE($3, street2),
                city = COALESCE($4, city),
                zip = COALESCE($5, zip),
                state_code = COALESCE($6, state_code),
                country_code = COALESCE($7, country_code),
                latitude = COALESCE($8, latitude),
                longitude = COALESCE($9, longitude),
                pluscode = COALESCE($10, pluscode)
            WHERE partner_id = $1
            "#,
        )
        .bind(partner_id)
        .bind(&changes.street)
        .bind(&changes.street2)
        .bind(&changes.city)
        .bind(&changes.zip)
        .bind(&changes.state_code)
        .bind(&changes.country_code)
        .bind(changes.latitude)
        .bind(changes.longitude)
        .bind(&changes.pluscode)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to apply address changes: {}", e))
        })?;

        timer.observe_duration();

        Ok(())
    }

    async fn country_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM countries WHERE UPPER(code) = UPPER($1))",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check country: {}", e)))?;
        Ok(exists)
    }

    async fn state_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM states WHERE UPPER(code) = UPPER($1))",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check state: {}", e)))?;
        Ok(exists)
    }

    async fn upsert_ps_code(&self, code: &str, description: &str) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_ps_code"])
            .start_timer();

        let existing: Option<String> =
            sqlx::query_scalar("SELECT code FROM ps_codes WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to check ps code: {}", e))
                })?;

        let created = existing.is_none();
        sqlx::query(
            r#"
            INSERT INTO ps_codes (code, description, active)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (code) DO UPDATE
            SET description = EXCLUDED.description,
                active = TRUE,
                updated_utc = NOW()
            "#,
        )
        .bind(code)
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to upsert ps code: {}", e)))?;

        timer.observe_duration();

        Ok(created)
    }

    async fn deactivate_ps_codes_except(&self, codes: &[String]) -> Result<u64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["deactivate_ps_codes_except"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE ps_codes
            SET active = FALSE, updated_utc = NOW()
            WHERE active = TRUE AND NOT (code = ANY($1))
            "#,
        )
        .bind(codes)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to deactivate ps codes: {}", e))
        })?;

        timer.observe_duration();

        Ok(result.rows_affected())
    }

    async fn list_ps_codes(&self, active_only: bool) -> Result<Vec<PsCode>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_ps_codes"])
            .start_timer();

        let codes = sqlx::query_as::<_, PsCode>(
            r#"
            SELECT code, description, active, updated_utc
            FROM ps_codes
            WHERE ($1::bool = FALSE OR active = TRUE)
            ORDER BY code
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list ps codes: {}", e)))?;

        timer.observe_duration();

        Ok(codes)
    }
}
