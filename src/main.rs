use clap::Parser;
use miette::Result;
use mfgdocs::cli::logging::init_logging;
use mfgdocs::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(global.verbose, global.quiet);

    match cli.command {
        Commands::Init(args) => mfgdocs::cli::commands::init::run(args),
        Commands::New(args) => mfgdocs::cli::commands::new::run(args, &global),
        Commands::List(args) => mfgdocs::cli::commands::list::run(args, &global),
        Commands::Show(args) => mfgdocs::cli::commands::show::run(args, &global),
        Commands::Deps(args) => mfgdocs::cli::commands::deps::run(args, &global),
        Commands::Graph(args) => mfgdocs::cli::commands::graph::run(args, &global),
        Commands::Search(args) => mfgdocs::cli::commands::search::run(args, &global),
        Commands::Validate(args) => mfgdocs::cli::commands::validate::run(args, &global),
        Commands::Step(cmd) => mfgdocs::cli::commands::step::run(cmd, &global),
        Commands::Completions(args) => mfgdocs::cli::commands::completions::run(args),
    }
}
