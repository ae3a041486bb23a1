//! Postgres schema for every shop table.
//!
//! Unique constraints are named explicitly: the in-memory backend reports
//! the same names, so callers can match on them regardless of backend.
//! User ids are not foreign keys; users live in the identity system.

use sqlx::PgPool;
use tracing::info;

/// `CREATE` statements in dependency order. Each is idempotent.
pub const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS product_categories (
        id   UUID PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS filter_tags (
        id   UUID PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        CONSTRAINT filter_tags_name_key UNIQUE (name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS keywords (
        id             UUID PRIMARY KEY,
        name           TEXT NOT NULL,
        type           TEXT NOT NULL,
        filter_tag_ids UUID[] NOT NULL DEFAULT '{}',
        CONSTRAINT keywords_name_key UNIQUE (name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id              UUID PRIMARY KEY,
        name            TEXT NOT NULL,
        slug            TEXT NOT NULL,
        unit_price      BIGINT NOT NULL CHECK (unit_price >= 0),
        active          BOOLEAN NOT NULL DEFAULT TRUE,
        date_added      TIMESTAMPTZ NULL,
        last_modified   TIMESTAMPTZ NULL,
        category_id     UUID NOT NULL REFERENCES product_categories (id),
        description     TEXT NOT NULL DEFAULT '',
        capacity        BIGINT NULL,
        capacity_unit   TEXT NOT NULL DEFAULT 'ml',
        days_to_consume BIGINT NULL,
        review_counts   BIGINT NOT NULL DEFAULT 0,
        brand_id        UUID NULL REFERENCES filter_tags (id),
        is_sold_out     BOOLEAN NOT NULL DEFAULT FALSE,
        CONSTRAINT products_slug_key UNIQUE (slug)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_specifications (
        id          UUID PRIMARY KEY,
        product_id  UUID NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        name        TEXT NOT NULL,
        description TEXT NOT NULL,
        sort_order  BIGINT NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_keywords (
        id         UUID PRIMARY KEY,
        product_id UUID NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        keyword_id UUID NOT NULL REFERENCES keywords (id) ON DELETE CASCADE,
        count      INTEGER NOT NULL DEFAULT 0,
        CONSTRAINT product_keywords_product_id_keyword_id_key UNIQUE (product_id, keyword_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS surveys (
        id         UUID PRIMARY KEY,
        name       TEXT NOT NULL,
        sort_order BIGINT NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS survey_questions (
        id         UUID PRIMARY KEY,
        survey_id  UUID NULL REFERENCES surveys (id) ON DELETE SET NULL,
        content    TEXT NOT NULL,
        type       SMALLINT NOT NULL CHECK (type IN (1, 2, 3)),
        sort_order BIGINT NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS survey_question_items (
        id             UUID PRIMARY KEY,
        question_id    UUID NOT NULL REFERENCES survey_questions (id) ON DELETE CASCADE,
        content        TEXT NOT NULL,
        sort_order     BIGINT NOT NULL DEFAULT 0,
        filter_tag_ids UUID[] NOT NULL DEFAULT '{}'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS survey_results (
        id               UUID PRIMARY KEY,
        user_id          UUID NOT NULL,
        question_id      UUID NOT NULL REFERENCES survey_questions (id) ON DELETE CASCADE,
        chosen_answer_id UUID NULL REFERENCES survey_question_items (id) ON DELETE SET NULL,
        written_answer   TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id                   UUID PRIMARY KEY,
        user_id              UUID NOT NULL,
        gender               BOOLEAN NOT NULL DEFAULT TRUE,
        contact              TEXT NOT NULL DEFAULT '',
        birthday             DATE NOT NULL,
        favorite_product_ids UUID[] NOT NULL DEFAULT '{}',
        CONSTRAINT profiles_user_id_key UNIQUE (user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_product_usages (
        id                UUID PRIMARY KEY,
        user_id           UUID NOT NULL,
        category_id       UUID NOT NULL REFERENCES product_categories (id),
        daily_amount_used BIGINT NOT NULL,
        unit              TEXT NOT NULL DEFAULT '',
        CONSTRAINT user_product_usages_user_id_category_id_key UNIQUE (user_id, category_id)
    )
    "#,
    // NULL dates are distinct under a Postgres UNIQUE constraint.
    r#"
    CREATE TABLE IF NOT EXISTS recommendations (
        id             UUID PRIMARY KEY,
        user_id        UUID NOT NULL,
        category_id    UUID NOT NULL REFERENCES product_categories (id),
        date           DATE NULL,
        comment        TEXT NOT NULL DEFAULT '',
        product_ids    UUID[] NOT NULL DEFAULT '{}',
        is_alerted     BOOLEAN NOT NULL DEFAULT FALSE,
        is_recommended BOOLEAN NOT NULL DEFAULT FALSE,
        CONSTRAINT recommendations_user_id_date_key UNIQUE (user_id, date)
    )
    "#,
];

/// The whole schema as one script.
pub fn ddl() -> String {
    STATEMENTS
        .iter()
        .map(|s| format!("{};\n", s.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Create every missing table.
pub async fn apply(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(tables = STATEMENTS.len(), "schema applied");
    Ok(())
}
