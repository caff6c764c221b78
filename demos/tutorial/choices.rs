use choicefig::{Choice, CliOption};

/// Every choice the tutorial program knows about.
pub fn tutorial_choices() -> Vec<Choice> {
    vec![
        Choice::new("connections").integer().default("0").option(
            CliOption::long("connections")
                .short('c')
                .value_name("COUNT")
                .help("Number of connections to open."),
        ),
        Choice::new("ssh")
            .boolean()
            .default("false")
            .switch(CliOption::long("ssh").help("Use ssh to open connection.")),
        Choice::new("protocol")
            .one_of(["http", "https", "ftp"])
            .default("https")
            .option(CliOption::long("protocol").short('p').help("One of http, https or ftp.")),
        Choice::new("files").length(1..=4).arglist(),
    ]
}
