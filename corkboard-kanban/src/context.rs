//! KanbanContext - I/O primitives for board storage
//!
//! The context provides access to storage and configuration. No business
//! logic lives here; operations do all the work.

use crate::config::KanbanConfig;
use crate::error::{KanbanError, Result};
use crate::types::{Board, Card, CardId, Column, ColumnId, Message, MessageId, User, UserId};
use corkboard_operations::LogEntry;
use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, trace};

/// Storage for one board, rooted at a directory
#[derive(Debug, Clone)]
pub struct KanbanContext {
    root: PathBuf,
    config: Arc<KanbanConfig>,
}

impl KanbanContext {
    /// Create a context with default configuration
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: Arc::new(KanbanConfig::default()),
        }
    }

    /// Create a context, loading configuration from the board root and environment
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = KanbanConfig::load(&root)?;
        Ok(Self {
            root,
            config: Arc::new(config),
        })
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: KanbanConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn config(&self) -> &KanbanConfig {
        &self.config
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Get the board root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to board.json
    pub fn board_path(&self) -> PathBuf {
        self.root.join("board.json")
    }

    pub fn columns_dir(&self) -> PathBuf {
        self.root.join("columns")
    }

    pub fn column_path(&self, id: &ColumnId) -> PathBuf {
        self.columns_dir().join(format!("{}.json", id))
    }

    pub fn cards_dir(&self) -> PathBuf {
        self.root.join("cards")
    }

    pub fn card_path(&self, id: &CardId) -> PathBuf {
        self.cards_dir().join(format!("{}.json", id))
    }

    pub fn messages_dir(&self) -> PathBuf {
        self.root.join("messages")
    }

    pub fn message_path(&self, id: &MessageId) -> PathBuf {
        self.messages_dir().join(format!("{}.json", id))
    }

    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    pub fn user_path(&self, id: &UserId) -> PathBuf {
        self.users_dir().join(format!("{}.json", id))
    }

    /// Path to the activity directory
    pub fn activity_dir(&self) -> PathBuf {
        self.root.join("activity")
    }

    /// Path to the current activity log
    pub fn activity_path(&self) -> PathBuf {
        self.activity_dir().join("current.jsonl")
    }

    /// Path to the lock file
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    // =========================================================================
    // Directory initialization
    // =========================================================================

    /// Check if the board is initialized
    pub fn is_initialized(&self) -> bool {
        self.board_path().exists()
    }

    /// Create the directory structure for a new board. Idempotent.
    pub async fn create_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        fs::create_dir_all(self.columns_dir()).await?;
        fs::create_dir_all(self.cards_dir()).await?;
        fs::create_dir_all(self.messages_dir()).await?;
        fs::create_dir_all(self.users_dir()).await?;
        fs::create_dir_all(self.activity_dir()).await?;
        Ok(())
    }

    // =========================================================================
    // Board I/O
    // =========================================================================

    pub async fn read_board(&self) -> Result<Board> {
        read_json(&self.board_path(), || KanbanError::NotInitialized {
            path: self.root.clone(),
        })
        .await
    }

    pub async fn write_board(&self, board: &Board) -> Result<()> {
        write_json(&self.board_path(), board).await
    }

    // =========================================================================
    // Column I/O
    // =========================================================================

    pub async fn read_column(&self, id: &ColumnId) -> Result<Column> {
        read_json(&self.column_path(id), || KanbanError::ColumnNotFound {
            id: id.to_string(),
        })
        .await
    }

    pub async fn write_column(&self, column: &Column) -> Result<()> {
        write_json(&self.column_path(&column.id), column).await
    }

    /// Read every column in board order
    pub async fn read_columns(&self, board: &Board) -> Result<Vec<Column>> {
        let mut columns = Vec::with_capacity(board.sequence.len());
        for id in &board.sequence {
            columns.push(self.read_column(id).await?);
        }
        Ok(columns)
    }

    // =========================================================================
    // Card I/O
    // =========================================================================

    pub async fn read_card(&self, id: &CardId) -> Result<Card> {
        read_json(&self.card_path(id), || KanbanError::CardNotFound {
            id: id.to_string(),
        })
        .await
    }

    pub async fn write_card(&self, card: &Card) -> Result<()> {
        write_json(&self.card_path(&card.id), card).await
    }

    /// Read every card of a column in column order
    pub async fn read_cards(&self, column: &Column) -> Result<Vec<Card>> {
        let mut cards = Vec::with_capacity(column.sequence.len());
        for id in &column.sequence {
            cards.push(self.read_card(id).await?);
        }
        Ok(cards)
    }

    // =========================================================================
    // Message I/O
    // =========================================================================

    pub async fn read_message(&self, id: &MessageId) -> Result<Message> {
        read_json(&self.message_path(id), || KanbanError::MessageNotFound {
            id: id.to_string(),
        })
        .await
    }

    pub async fn write_message(&self, message: &Message) -> Result<()> {
        write_json(&self.message_path(&message.id), message).await
    }

    // =========================================================================
    // User I/O
    // =========================================================================

    pub async fn read_user(&self, id: &UserId) -> Result<User> {
        read_json(&self.user_path(id), || KanbanError::UserNotFound {
            id: id.to_string(),
        })
        .await
    }

    /// Register or rename a user
    pub async fn write_user(&self, user: &User) -> Result<()> {
        write_json(&self.user_path(&user.id), user).await
    }

    /// Read all registered users, sorted by id
    pub async fn read_all_users(&self) -> Result<Vec<User>> {
        let dir = self.users_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let content = fs::read_to_string(&path).await?;
                users.push(serde_json::from_str::<User>(&content)?);
            }
        }
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    // =========================================================================
    // Staged changes
    // =========================================================================

    /// Start a set of file changes that land together or not at all
    pub fn changes(&self) -> Changes<'_> {
        Changes {
            ctx: self,
            writes: Vec::new(),
            removals: Vec::new(),
        }
    }

    // =========================================================================
    // Activity log
    // =========================================================================

    /// Append a log entry to the activity log
    pub async fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        let path = self.activity_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Read activity log entries, newest first
    pub async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let path = self.activity_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut entries: Vec<LogEntry> = content
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        entries.reverse();

        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Try to acquire an exclusive lock (non-blocking)
    pub async fn lock(&self) -> Result<KanbanLock> {
        let lock_path = self.lock_path();

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(KanbanLock { file }),
            Err(_) => Err(KanbanError::LockBusy),
        }
    }
}

/// RAII lock guard - releases on drop
pub struct KanbanLock {
    file: std::fs::File,
}

impl Drop for KanbanLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Writes and removals across several files, applied by [`Changes::commit`]
///
/// Every write is staged to a temp file before anything is renamed into
/// place. If a rename or removal fails, the files already touched are put
/// back to their previous content.
#[derive(Debug)]
pub struct Changes<'a> {
    ctx: &'a KanbanContext,
    writes: Vec<(PathBuf, Vec<u8>)>,
    removals: Vec<PathBuf>,
}

impl Changes<'_> {
    pub fn write_board(&mut self, board: &Board) -> Result<()> {
        self.write(self.ctx.board_path(), board)
    }

    pub fn write_column(&mut self, column: &Column) -> Result<()> {
        self.write(self.ctx.column_path(&column.id), column)
    }

    pub fn write_card(&mut self, card: &Card) -> Result<()> {
        self.write(self.ctx.card_path(&card.id), card)
    }

    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        self.write(self.ctx.message_path(&message.id), message)
    }

    pub fn delete_column(&mut self, id: &ColumnId) {
        self.removals.push(self.ctx.column_path(id));
    }

    /// Remove a card file along with its discussion messages
    pub fn delete_card(&mut self, card: &Card) {
        for message in &card.discussion {
            self.delete_message(message);
        }
        self.removals.push(self.ctx.card_path(&card.id));
    }

    pub fn delete_message(&mut self, id: &MessageId) {
        self.removals.push(self.ctx.message_path(id));
    }

    /// Number of files this will touch
    pub fn len(&self) -> usize {
        self.writes.len() + self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A later write to the same file replaces the earlier one
    fn write<T: Serialize>(&mut self, path: PathBuf, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?.into_bytes();
        match self.writes.iter_mut().find(|(p, _)| *p == path) {
            Some(existing) => existing.1 = content,
            None => self.writes.push((path, content)),
        }
        Ok(())
    }

    /// Apply every change, or none of them
    pub async fn commit(self) -> Result<()> {
        let mut staged = Vec::with_capacity(self.writes.len());
        for (path, content) in &self.writes {
            match stage(path, content).await {
                Ok(temp) => staged.push(temp),
                Err(e) => {
                    discard(&staged).await;
                    return Err(e);
                }
            }
        }

        let targets = self.writes.iter().map(|(path, _)| path).chain(&self.removals);
        let mut previous = Vec::with_capacity(self.len());
        for path in targets {
            match read_optional(path).await {
                Ok(content) => previous.push((path, content)),
                Err(e) => {
                    discard(&staged).await;
                    return Err(e);
                }
            }
        }

        for (temp, (path, _)) in staged.iter().zip(&self.writes) {
            if let Err(e) = fs::rename(temp, path).await {
                restore(&previous).await;
                discard(&staged).await;
                return Err(e.into());
            }
        }
        for path in &self.removals {
            if let Err(e) = remove_if_exists(path).await {
                restore(&previous).await;
                return Err(e);
            }
        }

        trace!(files = self.len(), "committed changes");
        Ok(())
    }
}

async fn stage(path: &Path, content: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let temp = path.with_extension("tmp");
    fs::write(&temp, content).await?;
    Ok(temp)
}

async fn discard(staged: &[PathBuf]) {
    for temp in staged {
        let _ = fs::remove_file(temp).await;
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(fs::read(path).await?))
}

async fn restore(previous: &[(&PathBuf, Option<Vec<u8>>)]) {
    for (path, content) in previous {
        let restored = match content {
            Some(content) => fs::write(path, content).await.map_err(KanbanError::from),
            None => remove_if_exists(path).await,
        };
        if let Err(e) = restored {
            error!(path = %path.display(), error = %e, "failed to restore file after a failed commit");
        }
    }
}

async fn read_json<T, F>(path: &Path, not_found: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> KanbanError,
{
    if !path.exists() {
        return Err(not_found());
    }
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    atomic_write(path, content.as_bytes()).await
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).await?;
    }
    Ok(())
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let temp = stage(path, content).await?;
    fs::rename(&temp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoardId;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, KanbanContext) {
        let temp = TempDir::new().unwrap();
        let ctx = KanbanContext::new(temp.path().join("board"));
        ctx.create_directories().await.unwrap();
        (temp, ctx)
    }

    #[tokio::test]
    async fn test_paths() {
        let (temp, ctx) = setup().await;
        let root = temp.path().join("board");

        assert_eq!(ctx.root(), root);
        assert_eq!(ctx.board_path(), root.join("board.json"));
        assert_eq!(
            ctx.card_path(&CardId::from("k1")),
            root.join("cards").join("k1.json")
        );
        assert_eq!(ctx.activity_path(), root.join("activity").join("current.jsonl"));
    }

    #[tokio::test]
    async fn test_board_io_and_not_initialized() {
        let (_temp, ctx) = setup().await;
        assert!(matches!(
            ctx.read_board().await,
            Err(KanbanError::NotInitialized { .. })
        ));

        let mut board = Board::new("Sprint");
        board.sequence = vec![ColumnId::from("a"), ColumnId::from("b")];
        ctx.write_board(&board).await.unwrap();
        assert!(ctx.is_initialized());
        assert_eq!(ctx.read_board().await.unwrap(), board);

        // Sequences are stored as comma-joined text
        let raw = std::fs::read_to_string(ctx.board_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["sequence"], json!("a,b"));
    }

    #[tokio::test]
    async fn test_card_delete_removes_messages() {
        let (_temp, ctx) = setup().await;
        let mut card = Card::new(ColumnId::from("c1"), "Card");
        let message = Message::new(card.id.clone(), UserId::from("u"), "hi");
        card.discussion.push(message.id.clone());
        ctx.write_card(&card).await.unwrap();
        ctx.write_message(&message).await.unwrap();

        let mut changes = ctx.changes();
        changes.delete_card(&card);
        assert_eq!(changes.len(), 2);
        changes.commit().await.unwrap();

        assert!(matches!(
            ctx.read_card(&card.id).await,
            Err(KanbanError::CardNotFound { .. })
        ));
        assert!(matches!(
            ctx.read_message(&message.id).await,
            Err(KanbanError::MessageNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_changes_land_together() {
        let (_temp, ctx) = setup().await;
        let mut todo = Column::new(BoardId::from("b"), "Todo");
        let card = Card::new(todo.id.clone(), "Card");
        let mut stale = todo.clone();
        stale.title = "Stale".into();
        todo.sequence.push(card.id.clone());

        let mut changes = ctx.changes();
        changes.write_column(&stale).unwrap();
        changes.write_column(&todo).unwrap();
        changes.write_card(&card).unwrap();
        changes.commit().await.unwrap();

        assert_eq!(ctx.read_column(&todo.id).await.unwrap(), todo);
        assert_eq!(ctx.read_card(&card.id).await.unwrap(), card);
        assert!(!ctx.column_path(&todo.id).with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_stage_leaves_files_untouched() {
        let (_temp, ctx) = setup().await;
        let mut source = Column::new(BoardId::from("b"), "Source");
        let mut target = Column::new(BoardId::from("b"), "Target");
        let card = Card::new(source.id.clone(), "Card");
        source.sequence.push(card.id.clone());
        ctx.write_column(&source).await.unwrap();
        ctx.write_column(&target).await.unwrap();

        // A directory squatting on the temp path makes staging the target fail
        fs::create_dir_all(ctx.column_path(&target.id).with_extension("tmp"))
            .await
            .unwrap();

        let before = source.clone();
        source.sequence.clear();
        target.sequence.push(card.id.clone());
        let mut changes = ctx.changes();
        changes.write_column(&source).unwrap();
        changes.write_column(&target).unwrap();
        let result = changes.commit().await;

        assert!(matches!(result, Err(KanbanError::Io(_))));
        assert_eq!(ctx.read_column(&source.id).await.unwrap(), before);
        assert!(ctx.read_column(&target.id).await.unwrap().sequence.is_empty());
        assert!(!ctx.column_path(&source.id).with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_users_sorted() {
        let (_temp, ctx) = setup().await;
        ctx.write_user(&User::new("bob", "Bob")).await.unwrap();
        ctx.write_user(&User::new("alice", "Alice")).await.unwrap();

        let users = ctx.read_all_users().await.unwrap();
        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob"]);
        assert!(matches!(
            ctx.read_user(&UserId::from("carol")).await,
            Err(KanbanError::UserNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_activity_newest_first() {
        let (_temp, ctx) = setup().await;
        for op in ["add card", "move card", "delete card"] {
            let entry = LogEntry::new(op, json!({}), json!([]), Duration::ZERO).with_actor("u");
            ctx.append_activity(&entry).await.unwrap();
        }

        let entries = ctx.read_activity(None).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].op, "delete card");
        assert_eq!(entries[2].op, "add card");

        let limited = ctx.read_activity(Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_locking() {
        let (_temp, ctx) = setup().await;

        let lock1 = ctx.lock().await.unwrap();

        let result = ctx.lock().await;
        assert!(matches!(result, Err(KanbanError::LockBusy)));

        drop(lock1);
        let _lock2 = ctx.lock().await.unwrap();
    }
}
