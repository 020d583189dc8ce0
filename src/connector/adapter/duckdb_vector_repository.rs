use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::{params, Connection, Row};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::interfaces::{StoreStats, VectorStore};
use crate::domain::{
    ChangeFrequency, ChunkType, CodeChunk, CodeSearchResult, DecisionClass, DomainError, Embedding,
    FileProfile, GitFilterClause, HistoryChunk, HistoryChunkType, HistorySearchResult, Language,
    PrimaryOwner, Severity, SignalRecord, SignalType, TemporalScope,
};

const META_DIMENSION_KEY: &str = "embedding_dimension";

/// DuckDB-backed [`VectorStore`] (§4.5): four logical tables — `chunks`,
/// `history`, `signals`, `file_profiles` — plus a `store_meta` table that
/// remembers the embedding dimension discovered on first insert, since
/// DuckDB's `FLOAT[n]` column type is fixed at `CREATE TABLE` time.
pub struct DuckdbVectorStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbVectorStore {
    pub fn new(path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(path)
            .map_err(|e| DomainError::storage(format!("failed to open DuckDB database: {e}")))?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DomainError::storage(format!("failed to open in-memory DuckDB: {e}")))?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            "INSTALL vss; LOAD vss; SET hnsw_enable_experimental_persistence = true;",
        )
        .map_err(|e| DomainError::storage(format!("failed to initialize VSS extension: {e}")))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS store_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS history (
                id TEXT PRIMARY KEY,
                chunk_type TEXT NOT NULL,
                sha TEXT NOT NULL,
                author TEXT NOT NULL,
                email TEXT NOT NULL,
                date TIMESTAMP NOT NULL,
                subject TEXT NOT NULL,
                body TEXT NOT NULL,
                branch TEXT NOT NULL,
                commit_type TEXT NOT NULL,
                scope TEXT,
                files_changed TEXT NOT NULL,
                additions INTEGER NOT NULL,
                deletions INTEGER NOT NULL,
                decision_class TEXT NOT NULL,
                file_path TEXT,
                text TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS signals (
                id TEXT PRIMARY KEY,
                signal_type TEXT NOT NULL,
                summary TEXT NOT NULL,
                severity TEXT NOT NULL,
                confidence REAL NOT NULL,
                directory_scope TEXT NOT NULL,
                scope_start TIMESTAMP NOT NULL,
                scope_end TIMESTAMP NOT NULL,
                contributing_shas TEXT NOT NULL,
                metadata TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL
            );

            CREATE TABLE IF NOT EXISTS file_profiles (
                path TEXT PRIMARY KEY,
                primary_owner_author TEXT,
                primary_owner_percentage REAL,
                primary_owner_commits INTEGER,
                primary_owner_last_change TIMESTAMP,
                contributor_count INTEGER NOT NULL,
                stability_score REAL NOT NULL,
                total_changes INTEGER NOT NULL,
                revert_count INTEGER NOT NULL,
                fix_after_feature_count INTEGER NOT NULL,
                change_frequency TEXT NOT NULL,
                risk_score REAL NOT NULL,
                last_modified TIMESTAMP NOT NULL,
                active_signal_ids TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| DomainError::storage(format!("failed to initialize DuckDB schema: {e}")))?;

        debug!("DuckDB schema initialized");
        Ok(())
    }

    /// Reads the persisted embedding dimension, if any insert has happened yet.
    fn read_dimension(conn: &Connection) -> Result<Option<usize>, DomainError> {
        conn.query_row(
            "SELECT value FROM store_meta WHERE key = ?",
            params![META_DIMENSION_KEY],
            |row| row.get::<_, String>(0),
        )
        .map(|v| v.parse::<usize>().ok())
        .or_else(|e| match e {
            duckdb::Error::QueryReturnedNoRows => Ok(None),
            other => Err(DomainError::storage(format!(
                "failed to read store_meta: {other}"
            ))),
        })
    }

    /// Ensures the vector-bearing `table`'s `embedding` column exists at
    /// dimension `dim`, creating the table (and its HNSW index) on first
    /// use and validating later calls against the persisted dimension
    /// (invariant v: "the store's dimension, once set, never changes").
    fn ensure_dimension(conn: &Connection, table: &str, dim: usize) -> Result<(), DomainError> {
        let existing = Self::read_dimension(conn)?;
        if let Some(existing) = existing {
            if existing != dim {
                return Err(DomainError::invalid_input(format!(
                    "embedding dimension mismatch: store is {existing}, batch is {dim}"
                )));
            }
            return Ok(());
        }

        let create_chunks = format!(
            r#"CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                file_path TEXT NOT NULL,
                package_name TEXT,
                name TEXT,
                chunk_type TEXT NOT NULL,
                language TEXT NOT NULL,
                exported BOOLEAN NOT NULL,
                line_start INTEGER NOT NULL,
                line_end INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding FLOAT[{dim}],
                model TEXT
            );
            CREATE TABLE IF NOT EXISTS history_embeddings (
                history_id TEXT PRIMARY KEY,
                embedding FLOAT[{dim}] NOT NULL,
                model TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS chunks_hnsw_idx ON chunks USING HNSW (embedding) WITH (metric = 'cosine');
            CREATE INDEX IF NOT EXISTS history_hnsw_idx ON history_embeddings USING HNSW (embedding) WITH (metric = 'cosine');
            "#
        );
        conn.execute_batch(&create_chunks)
            .map_err(|e| DomainError::storage(format!("failed to create vector tables: {e}")))?;
        conn.execute(
            "INSERT INTO store_meta (key, value) VALUES (?, ?)",
            params![META_DIMENSION_KEY, dim.to_string()],
        )
        .map_err(|e| DomainError::storage(format!("failed to persist store dimension: {e}")))?;
        let _ = table;
        Ok(())
    }

    fn vector_literal(vector: &[f32], dim: usize) -> String {
        let mut s = String::with_capacity(vector.len() * 8 + 16);
        s.push('[');
        for (i, v) in vector.iter().enumerate() {
            if i > 0 {
                s.push_str(", ");
            }
            s.push_str(&v.to_string());
        }
        s.push(']');
        s.push_str(&format!("::FLOAT[{dim}]"));
        s
    }

    fn row_to_chunk(row: &Row) -> Result<CodeChunk, duckdb::Error> {
        Ok(CodeChunk::reconstitute(
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            ChunkType::parse(&row.get::<_, String>(4)?),
            Language::parse(&row.get::<_, String>(5)?),
            row.get::<_, bool>(6)?,
            u32::try_from(row.get::<_, i64>(7)?).unwrap_or(0),
            u32::try_from(row.get::<_, i64>(8)?).unwrap_or(0),
            row.get::<_, String>(9)?,
        ))
    }

    fn row_to_history_chunk(row: &Row) -> Result<HistoryChunk, duckdb::Error> {
        let files_changed_json: String = row.get(11)?;
        let files_changed: Vec<String> =
            serde_json::from_str(&files_changed_json).unwrap_or_default();
        Ok(HistoryChunk::new(
            HistoryChunkType::parse(&row.get::<_, String>(1)?),
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, DateTime<Utc>>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, String>(8)?,
            row.get::<_, String>(9)?,
            row.get::<_, Option<String>>(10)?,
            files_changed,
            u32::try_from(row.get::<_, i64>(12)?).unwrap_or(0),
            u32::try_from(row.get::<_, i64>(13)?).unwrap_or(0),
            DecisionClass::parse(&row.get::<_, String>(14)?),
            row.get::<_, Option<String>>(15)?,
            row.get::<_, String>(16)?,
        ))
    }

    fn row_to_signal(row: &Row) -> Result<SignalRecord, duckdb::Error> {
        let shas_json: String = row.get(8)?;
        let contributing_shas: Vec<String> = serde_json::from_str(&shas_json).unwrap_or_default();
        let metadata_json: String = row.get(9)?;
        let metadata: serde_json::Value =
            serde_json::from_str(&metadata_json).unwrap_or(serde_json::Value::Null);
        Ok(SignalRecord::new(
            SignalType::parse(&row.get::<_, String>(1)?),
            row.get::<_, String>(2)?,
            Severity::parse(&row.get::<_, String>(3)?),
            row.get::<_, f64>(4)? as f32,
            row.get::<_, String>(5)?,
            TemporalScope {
                start: row.get::<_, DateTime<Utc>>(6)?,
                end: row.get::<_, DateTime<Utc>>(7)?,
            },
            contributing_shas,
            metadata,
            row.get::<_, DateTime<Utc>>(10)?,
        ))
    }

    fn row_to_file_profile(row: &Row) -> Result<FileProfile, duckdb::Error> {
        let owner_author: Option<String> = row.get(1)?;
        let primary_owner = owner_author.map(|author| PrimaryOwner {
            author,
            percentage: row.get::<_, Option<f64>>(2).ok().flatten().unwrap_or(0.0) as f32,
            commits: row
                .get::<_, Option<i64>>(3)
                .ok()
                .flatten()
                .unwrap_or(0)
                .max(0) as u32,
            last_change: row
                .get::<_, Option<DateTime<Utc>>>(4)
                .ok()
                .flatten()
                .unwrap_or_else(Utc::now),
        });
        let signal_ids_json: String = row.get(13)?;
        let active_signal_ids: Vec<String> =
            serde_json::from_str(&signal_ids_json).unwrap_or_default();
        Ok(FileProfile::new(
            row.get::<_, String>(0)?,
            primary_owner,
            u32::try_from(row.get::<_, i64>(5)?).unwrap_or(0),
            row.get::<_, f64>(6)? as f32,
            u32::try_from(row.get::<_, i64>(7)?).unwrap_or(0),
            u32::try_from(row.get::<_, i64>(8)?).unwrap_or(0),
            u32::try_from(row.get::<_, i64>(9)?).unwrap_or(0),
            ChangeFrequency::parse(&row.get::<_, String>(10)?),
            row.get::<_, f64>(11)? as f32,
            row.get::<_, DateTime<Utc>>(12)?,
            active_signal_ids,
        ))
    }
}

fn clause_to_sql(clause: &GitFilterClause, params: &mut Vec<String>) -> String {
    match clause {
        GitFilterClause::DateAfter(d) => {
            params.push(d.to_rfc3339());
            format!("date >= ?")
        }
        GitFilterClause::DateBefore(d) => {
            params.push(d.to_rfc3339());
            format!("date <= ?")
        }
        GitFilterClause::Author(a) => {
            params.push(a.clone());
            "author = ?".to_string()
        }
        GitFilterClause::FilePath(prefix) => {
            // DuckDB's LIKE treats `%`/`_` as wildcards; escape before
            // appending our own trailing `%`. The result is still
            // interpolated into a string literal, so quotes are escaped too.
            let escaped = prefix
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
                .replace('\'', "''");
            format!(
                "(files_changed LIKE '%\"{escaped}%' ESCAPE '\\' OR file_path LIKE '{escaped}%' ESCAPE '\\')"
            )
        }
        GitFilterClause::CommitType(t) => {
            params.push(t.clone());
            "commit_type = ?".to_string()
        }
        GitFilterClause::DecisionClass(c) => {
            params.push(c.as_str().to_string());
            "decision_class = ?".to_string()
        }
    }
}

#[async_trait]
impl VectorStore for DuckdbVectorStore {
    async fn insert_chunks(
        &self,
        chunks: &[CodeChunk],
        embeddings: &[Embedding],
        replace_by_file: bool,
    ) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }
        let dim = embeddings
            .iter()
            .map(|e| e.dimensions())
            .next()
            .ok_or_else(|| DomainError::invalid_input("insert_chunks called with no embeddings"))?;

        let mut conn = self.conn.lock().await;
        Self::ensure_dimension(&conn, "chunks", dim)?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("failed to begin transaction: {e}")))?;

        if replace_by_file {
            let files: std::collections::HashSet<&str> =
                chunks.iter().map(|c| c.file_path()).collect();
            for file in files {
                tx.execute("DELETE FROM chunks WHERE file_path = ?", params![file])
                    .map_err(|e| DomainError::storage(format!("failed to clear file chunks: {e}")))?;
            }
        }

        let by_id: std::collections::HashMap<&str, &Embedding> =
            embeddings.iter().map(|e| (e.record_id(), e)).collect();
        for chunk in chunks {
            let Some(embedding) = by_id.get(chunk.id()) else {
                continue;
            };
            let vector_lit = Self::vector_literal(embedding.vector(), dim);
            let sql = format!(
                "INSERT OR REPLACE INTO chunks \
                 (id, file_path, package_name, name, chunk_type, language, exported, line_start, line_end, content, embedding, model) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, {vector_lit}, ?)"
            );
            tx.execute(
                &sql,
                params![
                    chunk.id(),
                    chunk.file_path(),
                    chunk.package_name(),
                    chunk.name(),
                    chunk.chunk_type().as_str(),
                    chunk.language().as_str(),
                    chunk.exported(),
                    chunk.line_start() as i64,
                    chunk.line_end() as i64,
                    chunk.content(),
                    embedding.model(),
                ],
            )
            .map_err(|e| DomainError::storage(format!("failed to insert chunk {}: {e}", chunk.id())))?;
        }

        tx.commit()
            .map_err(|e| DomainError::storage(format!("failed to commit chunk insert: {e}")))?;
        debug!(count = chunks.len(), "inserted code chunks");
        Ok(())
    }

    async fn insert_history(
        &self,
        chunks: &[HistoryChunk],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }
        let dim = embeddings
            .iter()
            .map(|e| e.dimensions())
            .next()
            .ok_or_else(|| DomainError::invalid_input("insert_history called with no embeddings"))?;

        let mut conn = self.conn.lock().await;
        Self::ensure_dimension(&conn, "history_embeddings", dim)?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("failed to begin transaction: {e}")))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO history \
                     (id, chunk_type, sha, author, email, date, subject, body, branch, commit_type, scope, \
                      files_changed, additions, deletions, decision_class, file_path, text) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .map_err(|e| DomainError::storage(format!("failed to prepare history insert: {e}")))?;
            for chunk in chunks {
                let files_json = serde_json::to_string(chunk.files_changed())
                    .map_err(|e| DomainError::internal(format!("failed to encode files_changed: {e}")))?;
                stmt.execute(params![
                    chunk.id(),
                    chunk.chunk_type().as_str(),
                    chunk.sha(),
                    chunk.author(),
                    chunk.email(),
                    chunk.date(),
                    chunk.subject(),
                    chunk.body(),
                    chunk.branch(),
                    chunk.commit_type(),
                    chunk.scope(),
                    files_json,
                    chunk.additions() as i64,
                    chunk.deletions() as i64,
                    chunk.decision_class().as_str(),
                    chunk.file_path(),
                    chunk.text(),
                ])
                .map_err(|e| DomainError::storage(format!("failed to insert history chunk {}: {e}", chunk.id())))?;
            }
        }

        let by_id: std::collections::HashMap<&str, &Embedding> =
            embeddings.iter().map(|e| (e.record_id(), e)).collect();
        for chunk in chunks {
            let Some(embedding) = by_id.get(chunk.id()) else {
                continue;
            };
            let vector_lit = Self::vector_literal(embedding.vector(), dim);
            let sql = format!(
                "INSERT OR REPLACE INTO history_embeddings (history_id, embedding, model) VALUES (?, {vector_lit}, ?)"
            );
            tx.execute(&sql, params![chunk.id(), embedding.model()])
                .map_err(|e| DomainError::storage(format!("failed to insert history embedding {}: {e}", chunk.id())))?;
        }

        tx.commit()
            .map_err(|e| DomainError::storage(format!("failed to commit history insert: {e}")))?;
        debug!(count = chunks.len(), "inserted history chunks");
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        file_filter: Option<&str>,
    ) -> Result<Vec<CodeSearchResult>, DomainError> {
        let conn = self.conn.lock().await;
        let dim = match Self::read_dimension(&conn)? {
            Some(d) => d,
            None => return Ok(Vec::new()),
        };
        if query_embedding.len() != dim {
            return Err(DomainError::invalid_input(format!(
                "query embedding dimension {} does not match store dimension {dim}",
                query_embedding.len()
            )));
        }
        let vector_lit = Self::vector_literal(query_embedding, dim);

        let mut sql = format!(
            "SELECT id, file_path, package_name, name, chunk_type, language, exported, line_start, line_end, content, \
             1.0 - array_cosine_distance(embedding, {vector_lit}) AS score \
             FROM chunks WHERE embedding IS NOT NULL"
        );
        if let Some(prefix) = file_filter {
            let escaped = prefix.replace('\'', "''");
            sql.push_str(&format!(" AND file_path LIKE '{escaped}%'"));
        }
        sql.push_str(&format!(" ORDER BY array_cosine_distance(embedding, {vector_lit}) LIMIT ?"));

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::storage(format!("failed to prepare search: {e}")))?;
        let mut rows = stmt
            .query(params![limit as i64])
            .map_err(|e| DomainError::storage(format!("failed to run search: {e}")))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::storage(format!("failed to read search row: {e}")))?
        {
            let score: f32 = row
                .get(10)
                .map_err(|e| DomainError::storage(format!("failed to read score: {e}")))?;
            let chunk = Self::row_to_chunk(row)
                .map_err(|e| DomainError::storage(format!("failed to parse chunk row: {e}")))?;
            results.push(CodeSearchResult::new(chunk, score));
        }
        Ok(results)
    }

    async fn search_git_history(
        &self,
        query_embedding: &[f32],
        limit: usize,
        clauses: &[GitFilterClause],
    ) -> Result<Vec<HistorySearchResult>, DomainError> {
        let conn = self.conn.lock().await;
        let dim = match Self::read_dimension(&conn)? {
            Some(d) => d,
            None => return Ok(Vec::new()),
        };
        if query_embedding.len() != dim {
            return Err(DomainError::invalid_input(format!(
                "query embedding dimension {} does not match store dimension {dim}",
                query_embedding.len()
            )));
        }
        let vector_lit = Self::vector_literal(query_embedding, dim);

        let mut sql_params: Vec<String> = Vec::new();
        let where_clauses: Vec<String> = clauses
            .iter()
            .map(|c| clause_to_sql(c, &mut sql_params))
            .collect();

        let mut sql = format!(
            "SELECT h.id, h.chunk_type, h.sha, h.author, h.email, h.date, h.subject, h.body, h.branch, \
             h.commit_type, h.scope, h.files_changed, h.additions, h.deletions, h.decision_class, h.file_path, h.text, \
             1.0 - array_cosine_distance(e.embedding, {vector_lit}) AS score \
             FROM history h JOIN history_embeddings e ON e.history_id = h.id"
        );
        if !where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clauses.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY array_cosine_distance(e.embedding, {vector_lit}) LIMIT ?"));

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::storage(format!("failed to prepare git history search: {e}")))?;

        let mut bind_params: Vec<&dyn duckdb::ToSql> =
            sql_params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        let limit_i64 = limit as i64;
        bind_params.push(&limit_i64);

        let mut rows = stmt
            .query(bind_params.as_slice())
            .map_err(|e| DomainError::storage(format!("failed to run git history search: {e}")))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::storage(format!("failed to read git history row: {e}")))?
        {
            let score: f32 = row
                .get(17)
                .map_err(|e| DomainError::storage(format!("failed to read score: {e}")))?;
            let chunk = Self::row_to_history_chunk(row)
                .map_err(|e| DomainError::storage(format!("failed to parse history row: {e}")))?;
            results.push(HistorySearchResult::new(chunk, score));
        }
        Ok(results)
    }

    async fn delete_by_file_path(&self, file_path: &str) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let deleted = conn
            .execute("DELETE FROM chunks WHERE file_path = ?", params![file_path])
            .map_err(|e| DomainError::storage(format!("failed to delete chunks: {e}")))?;
        Ok(deleted as u64)
    }

    async fn replace_signals(&self, signals: &[SignalRecord]) -> Result<(), DomainError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("failed to begin transaction: {e}")))?;
        tx.execute("DELETE FROM signals", [])
            .map_err(|e| DomainError::storage(format!("failed to clear signals: {e}")))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO signals \
                     (id, signal_type, summary, severity, confidence, directory_scope, scope_start, scope_end, \
                      contributing_shas, metadata, created_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .map_err(|e| DomainError::storage(format!("failed to prepare signal insert: {e}")))?;
            for signal in signals {
                let shas_json = serde_json::to_string(signal.contributing_shas())
                    .map_err(|e| DomainError::internal(format!("failed to encode contributing_shas: {e}")))?;
                let metadata_json = serde_json::to_string(signal.metadata())
                    .map_err(|e| DomainError::internal(format!("failed to encode metadata: {e}")))?;
                stmt.execute(params![
                    signal.id(),
                    signal.signal_type().as_str(),
                    signal.summary(),
                    signal.severity().as_str(),
                    signal.confidence() as f64,
                    signal.directory_scope(),
                    signal.temporal_scope().start,
                    signal.temporal_scope().end,
                    shas_json,
                    metadata_json,
                    signal.created_at(),
                ])
                .map_err(|e| DomainError::storage(format!("failed to insert signal {}: {e}", signal.id())))?;
            }
        }
        tx.commit()
            .map_err(|e| DomainError::storage(format!("failed to commit signals: {e}")))?;
        Ok(())
    }

    async fn upsert_file_profiles(&self, profiles: &[FileProfile]) -> Result<(), DomainError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("failed to begin transaction: {e}")))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO file_profiles \
                     (path, primary_owner_author, primary_owner_percentage, primary_owner_commits, primary_owner_last_change, \
                      contributor_count, stability_score, total_changes, revert_count, fix_after_feature_count, \
                      change_frequency, risk_score, last_modified, active_signal_ids) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .map_err(|e| DomainError::storage(format!("failed to prepare profile upsert: {e}")))?;
            for profile in profiles {
                let signal_ids_json = serde_json::to_string(profile.active_signal_ids())
                    .map_err(|e| DomainError::internal(format!("failed to encode active_signal_ids: {e}")))?;
                let owner = profile.primary_owner();
                stmt.execute(params![
                    profile.path(),
                    owner.map(|o| o.author.as_str()),
                    owner.map(|o| o.percentage as f64),
                    owner.map(|o| o.commits as i64),
                    owner.map(|o| o.last_change),
                    profile.contributor_count() as i64,
                    profile.stability_score() as f64,
                    profile.total_changes() as i64,
                    profile.revert_count() as i64,
                    profile.fix_after_feature_count() as i64,
                    profile.change_frequency().as_str(),
                    profile.risk_score() as f64,
                    profile.last_modified(),
                    signal_ids_json,
                ])
                .map_err(|e| DomainError::storage(format!("failed to upsert profile {}: {e}", profile.path())))?;
            }
        }
        tx.commit()
            .map_err(|e| DomainError::storage(format!("failed to commit profiles: {e}")))?;
        Ok(())
    }

    async fn get_file_profile(&self, path: &str) -> Result<Option<FileProfile>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT path, primary_owner_author, primary_owner_percentage, primary_owner_commits, primary_owner_last_change, \
                 contributor_count, stability_score, total_changes, revert_count, fix_after_feature_count, \
                 change_frequency, risk_score, last_modified, active_signal_ids \
                 FROM file_profiles WHERE path = ?",
            )
            .map_err(|e| DomainError::storage(format!("failed to prepare profile lookup: {e}")))?;
        let mut rows = stmt
            .query(params![path])
            .map_err(|e| DomainError::storage(format!("failed to run profile lookup: {e}")))?;
        match rows
            .next()
            .map_err(|e| DomainError::storage(format!("failed to read profile row: {e}")))?
        {
            Some(row) => Ok(Some(Self::row_to_file_profile(row).map_err(|e| {
                DomainError::storage(format!("failed to parse profile row: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    async fn get_signals_covering(&self, path: &str) -> Result<Vec<SignalRecord>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, signal_type, summary, severity, confidence, directory_scope, scope_start, scope_end, \
                 contributing_shas, metadata, created_at FROM signals",
            )
            .map_err(|e| DomainError::storage(format!("failed to prepare signal scan: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| DomainError::storage(format!("failed to run signal scan: {e}")))?;

        let mut matched = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::storage(format!("failed to read signal row: {e}")))?
        {
            let signal = Self::row_to_signal(row)
                .map_err(|e| DomainError::storage(format!("failed to parse signal row: {e}")))?;
            if signal.covers(path) {
                matched.push(signal);
            }
        }
        Ok(matched)
    }

    async fn get_stats(&self) -> Result<StoreStats, DomainError> {
        let conn = self.conn.lock().await;
        let chunk_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .unwrap_or(0);
        let history_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
            .unwrap_or(0);
        let signal_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM signals", [], |row| row.get(0))
            .unwrap_or(0);
        let file_profile_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM file_profiles", [], |row| row.get(0))
            .unwrap_or(0);
        let dimension = Self::read_dimension(&conn)?;
        Ok(StoreStats {
            chunk_count: chunk_count as u64,
            history_count: history_count as u64,
            signal_count: signal_count as u64,
            file_profile_count: file_profile_count as u64,
            dimension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChunkType, Language};

    fn sample_chunk(path: &str) -> CodeChunk {
        CodeChunk::new(
            path.to_string(),
            None,
            Some("f".to_string()),
            ChunkType::Function,
            Language::Python,
            true,
            1,
            5,
            "def f(): pass".to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_search_round_trip() {
        let store = DuckdbVectorStore::in_memory().unwrap();
        let chunk = sample_chunk("a.py");
        let embedding = Embedding::new(chunk.id().to_string(), vec![1.0, 0.0, 0.0], "m".to_string());
        store
            .insert_chunks(&[chunk.clone()], &[embedding], false)
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 10, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item().file_path(), "a.py");
        assert!((results[0].score() - 1.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_dimension_persists_and_rejects_mismatch() {
        let store = DuckdbVectorStore::in_memory().unwrap();
        let chunk = sample_chunk("a.py");
        let embedding = Embedding::new(chunk.id().to_string(), vec![1.0, 0.0], "m".to_string());
        store.insert_chunks(&[chunk], &[embedding], false).await.unwrap();

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.dimension, Some(2));

        let bad_chunk = sample_chunk("b.py");
        let bad_embedding = Embedding::new(bad_chunk.id().to_string(), vec![1.0, 0.0, 0.0], "m".to_string());
        let err = store
            .insert_chunks(&[bad_chunk], &[bad_embedding], false)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_replace_by_file_removes_old_rows() {
        let store = DuckdbVectorStore::in_memory().unwrap();
        let c1 = sample_chunk("a.py");
        let e1 = Embedding::new(c1.id().to_string(), vec![1.0, 0.0], "m".to_string());
        store.insert_chunks(&[c1], &[e1], false).await.unwrap();

        let c2 = CodeChunk::new(
            "a.py".to_string(),
            None,
            Some("g".to_string()),
            ChunkType::Function,
            Language::Python,
            true,
            10,
            12,
            "def g(): pass".to_string(),
        );
        let e2 = Embedding::new(c2.id().to_string(), vec![0.0, 1.0], "m".to_string());
        store.insert_chunks(&[c2], &[e2], true).await.unwrap();

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.chunk_count, 1);
    }

    #[tokio::test]
    async fn test_file_profile_round_trip() {
        let store = DuckdbVectorStore::in_memory().unwrap();
        let profile = FileProfile::new(
            "src/a.py".to_string(),
            Some(PrimaryOwner {
                author: "Ada".to_string(),
                percentage: 80.0,
                commits: 12,
                last_change: Utc::now(),
            }),
            2,
            55.0,
            12,
            1,
            2,
            ChangeFrequency::Weekly,
            40.0,
            Utc::now(),
            vec!["deadbeef".to_string()],
        );
        store.upsert_file_profiles(&[profile]).await.unwrap();
        let loaded = store.get_file_profile("src/a.py").await.unwrap().unwrap();
        assert_eq!(loaded.contributor_count(), 2);
        assert!(loaded.is_sole_owned());
    }

    #[tokio::test]
    async fn test_signals_covering_prefix() {
        let store = DuckdbVectorStore::in_memory().unwrap();
        let signal = SignalRecord::new(
            SignalType::ChurnHotspot,
            "hot directory".to_string(),
            Severity::Warning,
            0.9,
            "src/a".to_string(),
            TemporalScope {
                start: Utc::now(),
                end: Utc::now(),
            },
            vec!["sha1".to_string()],
            serde_json::json!({}),
            Utc::now(),
        );
        store.replace_signals(&[signal]).await.unwrap();

        let covering = store.get_signals_covering("src/a/b.py").await.unwrap();
        assert_eq!(covering.len(), 1);
        let not_covering = store.get_signals_covering("src/other.py").await.unwrap();
        assert!(not_covering.is_empty());
    }
}
