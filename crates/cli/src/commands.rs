use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble a request and print the SQL it would run, without connecting
    Plan {
        #[arg(long, help = "Catalog file (JSON) describing repositories and relations")]
        catalog: String,

        #[arg(long, help = "Name of the repository to query")]
        repository: String,

        #[arg(long, help = "Request parameters file (JSON)")]
        params: String,

        #[arg(long, default_value = "postgres", help = "SQL dialect: postgres or mysql")]
        dialect: String,

        #[arg(
            long,
            help = "If specified, writes the JSON output to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Assemble a request, run it and print one page of results
    Query {
        #[arg(long, help = "Catalog file (JSON) describing repositories and relations")]
        catalog: String,

        #[arg(long, help = "Name of the repository to query")]
        repository: String,

        #[arg(long, help = "Request parameters file (JSON)")]
        params: String,

        /// Connection string; falls back to QUERYGATE_DATABASE_URL
        #[arg(long)]
        conn_str: Option<String>,

        /// Database driver; falls back to QUERYGATE_DRIVER, then the URL scheme
        #[arg(long)]
        driver: Option<String>,

        #[arg(long, help = "Extra KEY=VALUE file to read settings from")]
        env_file: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the JSON output to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Test a connection string
    TestConn {
        /// Database driver: "mysql", "postgres", …
        #[arg(long)]
        driver: Option<String>,

        /// Connection string
        #[arg(long)]
        conn_str: Option<String>,

        #[arg(long, help = "Extra KEY=VALUE file to read settings from")]
        env_file: Option<String>,
    },
}
