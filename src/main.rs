use clap::Parser;
use huntr_notion::cli::commands;
use huntr_notion::cli::{Cli, Commands};
use huntr_notion::core::logging;
use miette::Result;

fn main() -> Result<()> {
    // Restore default SIGPIPE so piping into `head` exits quietly instead of panicking.
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
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    if let Err(e) = logging::init(logging::default_filter(global.verbose, global.quiet)) {
        eprintln!("warning: {e}");
    }

    match cli.command {
        Commands::Upload(args) => commands::upload::run(args, &global),
        Commands::Count(args) => commands::count::run(args, &global),
        Commands::Schema(args) => commands::schema::run(args, &global),
        Commands::Sample(args) => commands::sample::run(args, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
