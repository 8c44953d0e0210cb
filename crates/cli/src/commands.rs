use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the page query a list request would run
    Plan {
        #[arg(long, help = "Entity to list")]
        entity: String,

        #[arg(long, help = "Sort column; the configured default when omitted")]
        sort_by: Option<String>,

        #[arg(long, help = "Sort in descending order")]
        desc: bool,

        #[arg(long, help = "Page size")]
        per_page: Option<u32>,

        #[arg(long, help = "Cursor token from a previous page")]
        cursor: Option<String>,

        #[arg(long, help = "List archived rows instead of live ones")]
        archived: bool,

        #[arg(long, default_value = "pg", help = "SQL dialect: pg or mysql")]
        dialect: String,

        #[arg(long, help = "Pagination settings file (JSON)")]
        settings: Option<String>,

        #[arg(long, help = "Print the plan as JSON")]
        json: bool,
    },
    /// Decode a cursor token
    InspectCursor {
        /// Cursor token (URL-safe base64)
        token: String,

        #[arg(
            long,
            help = "Check the cursor against this sort column (with --desc for descending)"
        )]
        sort_by: Option<String>,

        #[arg(long, help = "Sort direction to check against")]
        desc: bool,

        #[arg(long, help = "Print the cursor as JSON")]
        json: bool,
    },
    /// Build a cursor token from an anchor row
    EncodeCursor {
        #[arg(long, help = "Anchor row id")]
        id: String,

        #[arg(long, group = "value", help = "Integer sort value")]
        int: Option<i64>,

        #[arg(long, group = "value", help = "Text sort value")]
        text: Option<String>,

        #[arg(long, group = "value", help = "RFC 3339 timestamp sort value")]
        timestamp: Option<String>,

        #[arg(long, default_value = "created_at", help = "Sort column of the contract")]
        sort_by: String,

        #[arg(long, help = "Descending sort contract")]
        desc: bool,

        #[arg(long, help = "Cursor points to the previous page")]
        backwards: bool,
    },
}
