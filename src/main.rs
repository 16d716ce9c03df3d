//! Bill calculator entry point — CLI wiring and config-driven billing.

use std::path::Path;
use std::process;

use tariff_split::billing::{
    BillSummary, EstimateRequest, EstimateResult, compose_bill, estimate, split_bill,
};
use tariff_split::config::TariffConfig;
use tariff_split::export::{write_bill_to_path, write_split_to_path};

/// Parsed CLI arguments.
struct CliArgs {
    tariff_path: Option<String>,
    preset: Option<String>,
    kwh: Option<f64>,
    appliance_kwh: Option<f64>,
    discount: f64,
    pre_vat: Option<f64>,
    allocate_service_share: bool,
    split: Vec<String>,
    appliance_user: Option<String>,
    csv_out: Option<String>,
    #[cfg(feature = "json")]
    json: bool,
}

fn print_help() {
    eprintln!("tariff-split — tiered-tariff electricity bill calculator and splitter");
    eprintln!();
    eprintln!("Usage: tariff-split --kwh <f64> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --kwh <f64>              Total billed usage in kWh (required)");
    eprintln!("  --tariff <path>          Load tariff from TOML config file");
    eprintln!("  --preset <name>          Use a built-in tariff preset (mea_residential)");
    eprintln!("  --appliance-kwh <f64>    Appliance usage to attribute within the total");
    eprintln!("  --discount <f64>         Discount subtracted after VAT (default: 0)");
    eprintln!("  --pre-vat <f64>          Known pre-VAT bill amount; switches the");
    eprintln!("                           appliance estimate to the average-rate method");
    eprintln!("  --no-service-share       Marginal method: keep the service charge out");
    eprintln!("                           of the appliance share");
    eprintln!("  --split <names>          Comma-separated participant names");
    eprintln!("  --appliance-user <name>  Participant who owns the appliance usage");
    eprintln!("  --csv-out <path>         Export the split (or the bill) to CSV");
    #[cfg(feature = "json")]
    eprintln!("  --json                   Print results as JSON instead of text");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --tariff or --preset is given, the mea_residential preset is used.");
}

/// Returns the value following `flag`, exiting with a diagnostic if absent.
fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {flag} requires a value");
        process::exit(1);
    }
    &args[*i]
}

fn parse_number(value: &str, flag: &str) -> f64 {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            eprintln!("error: {flag} value \"{value}\" is not a valid number");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        tariff_path: None,
        preset: None,
        kwh: None,
        appliance_kwh: None,
        discount: 0.0,
        pre_vat: None,
        allocate_service_share: true,
        split: Vec::new(),
        appliance_user: None,
        csv_out: None,
        #[cfg(feature = "json")]
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--tariff" => {
                cli.tariff_path = Some(take_value(&args, &mut i, "--tariff").to_string());
            }
            "--preset" => {
                cli.preset = Some(take_value(&args, &mut i, "--preset").to_string());
            }
            "--kwh" => {
                let value = take_value(&args, &mut i, "--kwh");
                cli.kwh = Some(parse_number(value, "--kwh"));
            }
            "--appliance-kwh" => {
                let value = take_value(&args, &mut i, "--appliance-kwh");
                cli.appliance_kwh = Some(parse_number(value, "--appliance-kwh"));
            }
            "--discount" => {
                let value = take_value(&args, &mut i, "--discount");
                cli.discount = parse_number(value, "--discount");
            }
            "--pre-vat" => {
                let value = take_value(&args, &mut i, "--pre-vat");
                cli.pre_vat = Some(parse_number(value, "--pre-vat"));
            }
            "--no-service-share" => {
                cli.allocate_service_share = false;
            }
            "--split" => {
                let value = take_value(&args, &mut i, "--split");
                cli.split = value
                    .split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect();
            }
            "--appliance-user" => {
                cli.appliance_user = Some(take_value(&args, &mut i, "--appliance-user").to_string());
            }
            "--csv-out" => {
                cli.csv_out = Some(take_value(&args, &mut i, "--csv-out").to_string());
            }
            #[cfg(feature = "json")]
            "--json" => {
                cli.json = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

#[cfg(feature = "json")]
#[derive(serde::Serialize)]
struct JsonOutput<'a> {
    bill: &'a tariff_split::billing::BillBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    appliance: Option<&'a EstimateResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    split: Option<&'a [tariff_split::billing::Share]>,
}

fn main() {
    let cli = parse_args();

    // Load config: --tariff takes priority, then --preset, then the default
    let config = if let Some(ref path) = cli.tariff_path {
        match TariffConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match TariffConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        TariffConfig::default()
    };

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let Some(kwh) = cli.kwh else {
        eprintln!("error: --kwh is required");
        print_help();
        process::exit(1);
    };
    if kwh < 0.0 {
        eprintln!("error: --kwh must be >= 0");
        process::exit(1);
    }
    if cli.discount < 0.0 {
        eprintln!("error: --discount must be >= 0");
        process::exit(1);
    }

    let tariff = config.to_tariff();
    let bill = compose_bill(kwh, &tariff, cli.discount);

    // Appliance attribution: average-rate when a pre-VAT amount is supplied,
    // the bill differential otherwise
    let appliance = cli.appliance_kwh.map(|appliance_kwh| {
        let request = match cli.pre_vat {
            Some(pre_vat) => EstimateRequest::ProRata {
                bill: BillSummary::with_vat_rate(kwh, pre_vat, tariff.vat_rate),
                appliance_kwh,
            },
            None => EstimateRequest::Marginal {
                total_kwh: kwh,
                appliance_kwh,
                tariff: &tariff,
                allocate_service_proportionally: cli.allocate_service_share,
                discount: cli.discount,
            },
        };
        match estimate(&request) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    });

    let split = if cli.split.is_empty() {
        None
    } else {
        let appliance_cost = appliance
            .as_ref()
            .map_or(0.0, EstimateResult::appliance_cost);
        let user = cli.appliance_user.as_deref();
        match split_bill(bill.total, appliance_cost, &cli.split, user) {
            Ok(allocation) => Some(allocation),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    };

    #[cfg(feature = "json")]
    let text_mode = !cli.json;
    #[cfg(not(feature = "json"))]
    let text_mode = true;

    #[cfg(feature = "json")]
    if cli.json {
        let out = JsonOutput {
            bill: &bill,
            appliance: appliance.as_ref(),
            split: split.as_ref().map(|allocation| allocation.shares.as_slice()),
        };
        match serde_json::to_string_pretty(&out) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                process::exit(1);
            }
        }
    }

    if text_mode {
        println!("{bill}");
        if let Some(ref result) = appliance {
            println!("\n{result}");
        }
        if let Some(ref allocation) = split {
            println!("\n{allocation}");
        }
    }

    // Export CSV if requested: the split when present, the bill otherwise
    if let Some(ref path) = cli.csv_out {
        let result = match split {
            Some(ref allocation) => write_split_to_path(Path::new(path), &allocation.shares),
            None => write_bill_to_path(Path::new(path), &bill),
        };
        if let Err(e) = result {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Report written to {path}");
    }
}
