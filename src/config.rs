use std::ffi::OsStr;
use std::fs::File;

use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::config_processors::Unquote;

// Set some default values
const DEFAULT_BATCH_SIZE: usize = 256;
const DEFAULT_RECALL_CUTOFFS: &str = "1,5,10";
const DEFAULT_NDCG_CUTOFFS: &str = "5,10";
const DEFAULT_OUT_PATH: &str = "results.txt";

pub struct AppConfig {
    pub log: LogConfig,
    pub data: DataConfig,
    pub eval: EvalConfig,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub train_data_path: String,
    pub test_data_path: String,
    pub meta_path: String,
    pub scores_path: String,
}

pub struct EvalConfig {
    pub batch_size: usize,
    pub recall_cutoffs: Vec<usize>,
    pub ndcg_cutoffs: Vec<usize>,
    pub out_path: String,
}

impl AppConfig {
    pub fn new(config_path: String) -> AppConfig {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(&config_path) {
            let config_text = ConfigText::new(config_file, &config_path)
                .expect("Loading configuration file failed.");
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "train_data_path"]),
                OsStr::new("TRAIN_DATA"),
            ),
            (
                ConfPath::from(&["data", "test_data_path"]),
                OsStr::new("TEST_DATA"),
            ),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        AppConfig::parse(conf)
    }

    fn parse(conf: justconfig::Config) -> AppConfig {
        AppConfig {
            log: LogConfig::parse(&conf, ConfPath::from(&["log"])),
            data: DataConfig::parse(&conf, ConfPath::from(&["data"])),
            eval: EvalConfig::parse(&conf, ConfPath::from(&["eval"])),
        }
    }
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> LogConfig {
        LogConfig {
            level: conf
                .get(path.push("level"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("info")),
        }
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> DataConfig {
        DataConfig {
            train_data_path: conf
                .get(path.push("train_data_path"))
                .unquote()
                .value()
                .expect("data.train_data_path is required"),
            test_data_path: conf
                .get(path.push("test_data_path"))
                .unquote()
                .value()
                .expect("data.test_data_path is required"),
            meta_path: conf
                .get(path.push("meta_path"))
                .unquote()
                .value()
                .expect("data.meta_path is required"),
            scores_path: conf
                .get(path.push("scores_path"))
                .unquote()
                .value()
                .expect("data.scores_path is required"),
        }
    }
}

impl EvalConfig {
    fn parse(conf: &Config, path: ConfPath) -> EvalConfig {
        let recall_cutoffs: String = conf
            .get(path.push("recall_cutoffs"))
            .unquote()
            .value()
            .unwrap_or_else(|_| String::from(DEFAULT_RECALL_CUTOFFS));
        let ndcg_cutoffs: String = conf
            .get(path.push("ndcg_cutoffs"))
            .unquote()
            .value()
            .unwrap_or_else(|_| String::from(DEFAULT_NDCG_CUTOFFS));
        EvalConfig {
            batch_size: conf
                .get(path.push("batch_size"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_BATCH_SIZE),
            recall_cutoffs: parse_cutoffs(&recall_cutoffs),
            ndcg_cutoffs: parse_cutoffs(&ndcg_cutoffs),
            out_path: conf
                .get(path.push("out_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_OUT_PATH)),
        }
    }
}

fn parse_cutoffs(raw: &str) -> Vec<usize> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .unwrap_or_else(|_| panic!("invalid cutoff value: '{}'", part))
        })
        .collect()
}
