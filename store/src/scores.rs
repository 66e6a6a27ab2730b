use mines3d_core::{BoardSizeKey, Initials, Ledger, ScoreBackend, ScoreEntry};
use mines3d_protocol::{ScoreFile, ScoreQuery, ScoreRecord};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::*;

/// Converts a stored or submitted record, stamping it with `now` when it carries no date.
pub fn entry_from_record(record: ScoreRecord, now: OffsetDateTime) -> Result<ScoreEntry> {
    let recorded_at = match record.date {
        Some(date) => OffsetDateTime::parse(&date, &Rfc3339)
            .map_err(|source| StoreError::Date { date, source })?,
        None => now,
    };
    Ok(ScoreEntry {
        initials: Initials::new(&record.name)?,
        elapsed_secs: record.time,
        board_size: record.board_size.as_str().into(),
        recorded_at,
        submission_id: record.submission_id,
    })
}

pub fn record_from_entry(entry: &ScoreEntry) -> Result<ScoreRecord> {
    Ok(ScoreRecord {
        name: entry.initials.to_string(),
        time: entry.elapsed_secs,
        board_size: entry.board_size.to_string(),
        date: Some(entry.recorded_at.format(&Rfc3339)?),
        submission_id: entry.submission_id,
    })
}

fn records_from_entries<'a>(
    entries: impl IntoIterator<Item = &'a ScoreEntry>,
) -> Result<Vec<ScoreRecord>> {
    entries.into_iter().map(record_from_entry).collect()
}

/// Leaderboards kept in a single JSON file shaped like `{"scores": [...]}`.
#[derive(Clone, Debug)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored leaderboard, an empty ledger if the file does not exist yet.
    ///
    /// Records that do not convert (blank names, unparsable dates) are skipped with a warning,
    /// so one bad row never locks every board. They are dropped on the next save.
    pub fn load(&self) -> Result<Ledger> {
        let file: ScoreFile = read_json(&self.path)?.unwrap_or_default();
        let now = OffsetDateTime::now_utc();
        let entries = file.scores.into_iter().filter_map(|record| {
            match entry_from_record(record, now) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!(
                        "Skipping unreadable score in {}: {}",
                        self.path.display(),
                        err
                    );
                    None
                }
            }
        });
        Ok(Ledger::from_entries(entries))
    }

    /// Writes boards in key order, each in rank order.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut board_sizes: Vec<_> = ledger.board_sizes().collect();
        board_sizes.sort();
        let scores = records_from_entries(
            board_sizes
                .into_iter()
                .flat_map(|board_size| ledger.top(board_size)),
        )?;
        write_json(&self.path, &ScoreFile { scores })
    }

    pub fn top_scores(&self, board_size: &BoardSizeKey) -> Result<Vec<ScoreEntry>> {
        Ok(self.load()?.top(board_size).to_vec())
    }

    /// Ranks `entry` into the stored leaderboard and persists the result. On failure the file
    /// keeps its previous contents.
    pub fn submit(&self, entry: ScoreEntry) -> Result<Vec<ScoreEntry>> {
        let mut ledger = self.load()?;
        let top = ledger.submit(entry).to_vec();
        self.save(&ledger)?;
        Ok(top)
    }

    /// `GET /api/scores?boardSize=...`
    pub fn query(&self, query: &ScoreQuery) -> Result<Vec<ScoreRecord>> {
        let board_size = BoardSizeKey::from(query.board_size.as_str());
        records_from_entries(&self.top_scores(&board_size)?)
    }

    /// `POST /api/scores`: the date is assigned here unless the client sent one.
    pub fn submit_record(
        &self,
        record: ScoreRecord,
        now: OffsetDateTime,
    ) -> Result<Vec<ScoreRecord>> {
        let entry = entry_from_record(record, now)?;
        records_from_entries(&self.submit(entry)?)
    }
}

impl ScoreBackend for FileScoreStore {
    type Error = StoreError;

    fn top_scores(&mut self, board_size: &BoardSizeKey) -> Result<Vec<ScoreEntry>> {
        FileScoreStore::top_scores(self, board_size)
    }

    fn submit_score(&mut self, entry: ScoreEntry) -> Result<Vec<ScoreEntry>> {
        self.submit(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TempFile;
    use mines3d_core::{
        Board, BoardGenerator, Coord2, GameConfig, GameSession, WinRecord, record_win,
    };
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-06-01 10:00 UTC);

    fn record(name: &str, time: u32, board_size: &str) -> ScoreRecord {
        ScoreRecord {
            name: name.into(),
            time,
            board_size: board_size.into(),
            date: None,
            submission_id: None,
        }
    }

    fn times(records: &[ScoreRecord]) -> Vec<u32> {
        records.iter().map(|record| record.time).collect()
    }

    #[test]
    fn missing_file_has_no_scores() {
        let file = TempFile::new("missing");
        let store = FileScoreStore::new(&file.0);

        let top = store
            .query(&ScoreQuery {
                board_size: "8x8".into(),
            })
            .unwrap();

        assert!(top.is_empty());
        assert!(!file.0.exists());
    }

    #[test]
    fn submissions_persist_ranked_per_board() {
        let file = TempFile::new("ranked");
        let store = FileScoreStore::new(&file.0);

        store.submit_record(record("aaa", 42, "8x8"), NOW).unwrap();
        store.submit_record(record("bbb", 10, "8x8"), NOW).unwrap();
        store.submit_record(record("ccc", 7, "16x16"), NOW).unwrap();
        let top = store.submit_record(record("ddd", 55, "8x8"), NOW).unwrap();

        assert_eq!(times(&top), [10, 42, 55]);
        assert_eq!(top[0].name, "BBB");
        assert_eq!(top[0].date.as_deref(), Some("2024-06-01T10:00:00Z"));

        let reopened = FileScoreStore::new(&file.0);
        let query = ScoreQuery {
            board_size: "16x16".into(),
        };
        assert_eq!(times(&reopened.query(&query).unwrap()), [7]);
    }

    #[test]
    fn file_keeps_ten_per_board() {
        let file = TempFile::new("capped");
        let store = FileScoreStore::new(&file.0);

        for time in (1..=15).rev() {
            store.submit_record(record("abc", time, "8x8"), NOW).unwrap();
        }

        let stored: ScoreFile =
            serde_json::from_str(&std::fs::read_to_string(&file.0).unwrap()).unwrap();
        assert_eq!(times(&stored.scores), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn client_date_is_kept() {
        let file = TempFile::new("dated");
        let store = FileScoreStore::new(&file.0);
        let mut dated = record("abc", 3, "8x8");
        dated.date = Some("2023-12-31T23:59:59Z".into());

        let top = store.submit_record(dated, NOW).unwrap();

        assert_eq!(top[0].date.as_deref(), Some("2023-12-31T23:59:59Z"));
    }

    #[test]
    fn invalid_records_are_rejected_without_writing() {
        let file = TempFile::new("invalid");
        let store = FileScoreStore::new(&file.0);
        let mut bad_date = record("abc", 3, "8x8");
        bad_date.date = Some("yesterday".into());

        assert!(matches!(
            store.submit_record(bad_date, NOW),
            Err(StoreError::Date { .. })
        ));
        assert!(matches!(
            store.submit_record(record("   ", 3, "8x8"), NOW),
            Err(StoreError::Record(_))
        ));
        assert!(!file.0.exists());
    }

    #[test]
    fn unreadable_record_does_not_block_other_boards() {
        let file = TempFile::new("bad-record");
        std::fs::write(
            &file.0,
            r#"{"scores": [
                {"name": "", "time": 3, "boardSize": "24x24"},
                {"name": "abc", "time": 9, "boardSize": "8x8", "date": "last week"},
                {"name": "abc", "time": 5, "boardSize": "8x8"}
            ]}"#,
        )
        .unwrap();
        let store = FileScoreStore::new(&file.0);
        let query = ScoreQuery {
            board_size: "8x8".into(),
        };

        assert_eq!(times(&store.query(&query).unwrap()), [5]);

        let top = store.submit_record(record("zed", 4, "8x8"), NOW).unwrap();
        assert_eq!(times(&top), [4, 5]);
        assert!(store.top_scores(&"24x24".into()).unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error_and_left_alone() {
        let file = TempFile::new("corrupt");
        std::fs::write(&file.0, "{ not json").unwrap();
        let store = FileScoreStore::new(&file.0);

        assert!(matches!(
            store.submit_record(record("abc", 1, "8x8"), NOW),
            Err(StoreError::Json { .. })
        ));
        assert_eq!(std::fs::read_to_string(&file.0).unwrap(), "{ not json");
    }

    #[test]
    fn works_as_score_backend() {
        struct FixedLayout(Board);

        impl BoardGenerator for FixedLayout {
            fn generate(
                &mut self,
                _: &GameConfig,
                _: Coord2,
            ) -> mines3d_core::Result<Board> {
                Ok(self.0.clone())
            }
        }

        let file = TempFile::new("backend");
        let mut store = FileScoreStore::new(&file.0);
        let board = Board::from_mine_coords((2, 1), &[(1, 0)]).unwrap();
        let config = GameConfig::new_unchecked((2, 1), 1);
        let mut session = GameSession::new(config, FixedLayout(board));
        session.click_reveal((0, 0)).unwrap();

        let mut prompt = |_: u32| Some("xyz".to_string());
        let record = record_win(&session, &mut store, &mut prompt, NOW, Some(1)).unwrap();
        assert!(matches!(record, WinRecord::Submitted(ref top) if top.len() == 1));

        // a retried submission with the same id does not double count
        let entry = session
            .score_entry(Initials::new("xyz").unwrap(), NOW, Some(1))
            .unwrap();
        assert_eq!(store.submit(entry).unwrap().len(), 1);
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
