// Database schema initialization

use color_eyre::Result;

pub async fn create_schema(conn: &libsql::Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS parents (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            otp TEXT,
            role TEXT NOT NULL DEFAULT 'parent',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS children (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            parent_id INTEGER NOT NULL,
            classno INTEGER NOT NULL,
            avatar TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY(parent_id) REFERENCES parents(id) ON DELETE CASCADE
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_children_unique_name_parent
        ON children(name, parent_id)
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS subjects (
            id INTEGER PRIMARY KEY,
            classnumber INTEGER NOT NULL,
            name TEXT NOT NULL,
            price REAL NOT NULL DEFAULT 0
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_subjects_unique_name_class
        ON subjects(name, classnumber)
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS chapters (
            id INTEGER PRIMARY KEY,
            subject_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            video_url TEXT,
            chapter_number INTEGER NOT NULL,
            FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_chapters_unique_name_subject
        ON chapters(name, subject_id)
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS progress (
            id INTEGER PRIMARY KEY,
            child_id INTEGER NOT NULL,
            subject_id INTEGER NOT NULL,
            chapter_id INTEGER NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            progress_percentage INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(child_id) REFERENCES children(id) ON DELETE CASCADE,
            FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE,
            FOREIGN KEY(chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
        )
        "#,
        (),
    )
    .await?;

    // One progress record per child per chapter
    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_progress_unique_child_chapter
        ON progress(child_id, chapter_id)
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY,
            parent_id INTEGER NOT NULL,
            child_id INTEGER NOT NULL,
            subject_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            transaction_id TEXT NOT NULL UNIQUE,
            payment_date TEXT NOT NULL DEFAULT (datetime('now')),
            status TEXT NOT NULL DEFAULT 'success'
                CHECK(status IN ('success', 'pending', 'failed')),
            FOREIGN KEY(parent_id) REFERENCES parents(id) ON DELETE CASCADE,
            FOREIGN KEY(child_id) REFERENCES children(id) ON DELETE CASCADE,
            FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE
        )
        "#,
        (),
    )
    .await?;

    // user_id holds the child's id despite the name.
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS user_subjects (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            subject_id INTEGER NOT NULL,
            locked INTEGER NOT NULL DEFAULT 1,
            purchase_date TEXT,
            transaction_id TEXT,
            amount REAL,
            FOREIGN KEY(user_id) REFERENCES children(id) ON DELETE CASCADE,
            FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_user_subjects_unique_link
        ON user_subjects(user_id, subject_id)
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS quiz_questions (
            id INTEGER PRIMARY KEY,
            chapter_id INTEGER NOT NULL,
            question TEXT NOT NULL,
            options TEXT NOT NULL,
            correct_answer TEXT NOT NULL,
            marks INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS quiz_scores (
            id INTEGER PRIMARY KEY,
            child_id INTEGER NOT NULL,
            chapter_id INTEGER NOT NULL,
            score INTEGER NOT NULL,
            total_marks INTEGER NOT NULL,
            completed_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY(child_id) REFERENCES children(id) ON DELETE CASCADE,
            FOREIGN KEY(chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
        )
        "#,
        (),
    )
    .await?;

    Ok(())
}
