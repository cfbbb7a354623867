use std::{env, fs, path::PathBuf};

fn page_id() -> clap::Arg {
    clap::arg!(<ID> "Page id").value_parser(clap::value_parser!(u64))
}

fn report_output() -> clap::Arg {
    clap::arg!(-o --output <FILE> "Report file").value_parser(clap::value_parser!(PathBuf))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("wikiharvest")
        .version(env!("CARGO_PKG_VERSION"))
        .author("wikiharvest contributors")
        .about("Search Wikipedia and save cleaned article reports")
        .arg(clap::arg!(--lang <LANG> "Wikipedia language edition").global(true).default_value("tr"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").global(true).default_value("10"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").global(true))
        .arg(
            clap::arg!(--"locale-dir" <DIR> "Custom locale profile directory")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(clap::arg!(--"llm-url" <URL> "OpenAI-compatible endpoint used for guide summaries").global(true))
        .arg(clap::arg!(--"llm-model" <MODEL> "Model name for guide summaries").global(true))
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(
            clap::Command::new("search")
                .about("Search and write a report of the results")
                .arg(clap::arg!(<QUERY> "Search term"))
                .arg(clap::arg!(-l --limit <NUM> "Number of results").default_value("1"))
                .arg(report_output().default_value("wikipedia_results.txt"))
                .arg(clap::arg!(--enrich "Attach word counts, summaries and categories to each hit"))
                .arg(clap::arg!(--"min-words" <NUM> "Drop hits with fewer words").default_value("0"))
                .arg(clap::arg!(--category <NAME> "Keep hits in this category").action(clap::ArgAction::Append))
                .arg(clap::arg!(--sort <MODE> "Result ordering").value_parser(["relevance", "date"]).default_value("relevance"))
                .arg(clap::arg!(--json "Print hits as JSON")),
        )
        .subcommand(
            clap::Command::new("page")
                .about("Print the cleaned content of a page")
                .arg(page_id())
                .arg(clap::arg!(--json "Print content with metadata as JSON")),
        )
        .subcommand(
            clap::Command::new("analyze")
                .about("Summary, keywords or section headings of a page")
                .arg(page_id())
                .arg(
                    clap::arg!(-k --kind <KIND> "Analysis type")
                        .value_parser(["summary", "keywords", "sections", "all"])
                        .default_value("summary"),
                ),
        )
        .subcommand(
            clap::Command::new("compare")
                .about("Compare two pages by categories and vocabulary")
                .arg(clap::arg!(<FIRST> "First page id"))
                .arg(clap::arg!(<SECOND> "Second page id")),
        )
        .subcommand(clap::Command::new("categories").about("List the categories of a page").arg(page_id()))
        .subcommand(
            clap::Command::new("images")
                .about("List images of a page with their file URLs")
                .arg(page_id())
                .arg(clap::arg!(-l --limit <NUM> "Maximum images").default_value("10")),
        )
        .subcommand(
            clap::Command::new("related")
                .about("Pages sharing the first category of a page")
                .arg(page_id())
                .arg(
                    clap::arg!(-l --limit <NUM> "Maximum pages")
                        .value_parser(clap::value_parser!(u16).range(1..=20))
                        .default_value("5"),
                ),
        )
        .subcommand(
            clap::Command::new("advanced")
                .about("Search with exact phrases, exclusions and date ranges")
                .arg(clap::arg!(<QUERY> "Search term"))
                .arg(clap::arg!(--exact <PHRASE>))
                .arg(clap::arg!(--exclude <WORDS> "Space separated words to exclude"))
                .arg(clap::arg!(--from <DATE>))
                .arg(clap::arg!(--to <DATE>))
                .arg(clap::arg!(--category <NAME> "Category substring filter"))
                .arg(clap::arg!(--"min-words" <NUM>).default_value("0"))
                .arg(
                    clap::arg!(-l --limit <NUM>)
                        .value_parser(clap::value_parser!(u16).range(1..=50))
                        .default_value("10"),
                )
                .arg(report_output()),
        )
        .subcommand(
            clap::Command::new("topic")
                .about("Research a topic and its linked pages")
                .arg(clap::arg!(<TOPIC> "Topic to research"))
                .arg(
                    clap::arg!(-d --depth <DEPTH> "1 for main pages only, 2 or 3 to follow links")
                        .value_parser(clap::value_parser!(u8).range(1..=3))
                        .default_value("2"),
                )
                .arg(
                    clap::arg!(-l --limit <NUM> "Main pages to collect")
                        .value_parser(clap::value_parser!(u16).range(1..=10))
                        .default_value("5"),
                )
                .arg(report_output()),
        )
        .subcommand(
            clap::Command::new("completions")
                .about("Print shell completions")
                .arg(clap::arg!(<SHELL> "Target shell").value_parser(["bash", "zsh", "fish", "powershell", "elvish"])),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "wikiharvest", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "wikiharvest", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "wikiharvest", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "wikiharvest", &completions_dir).unwrap();

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
