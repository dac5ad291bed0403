// ==========================================
// DataNaut 数据中心 - 命令行入口
// ==========================================
// 用法:
//   datanaut-datahub import <entity> <file> [--owner U] [--format csv|xlsx] [--db PATH]
//   datanaut-datahub export <entity> [--owner U] [--format F] [--out PATH] [--db PATH]
//   datanaut-datahub template <entity> [--format F] [--out PATH] [--db PATH]
//   datanaut-datahub entities [--owner U] [--db PATH]
// 输出: JSON（stdout），日志走 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use datanaut_datahub::datahub::file_parser::UploadedFile;
use datanaut_datahub::datahub::table_writer::ExportFile;
use datanaut_datahub::db::get_default_db_path;
use datanaut_datahub::{logging, DataHubApi};
use serde_json::json;
use std::path::PathBuf;

const USAGE: &str = "usage:
  datanaut-datahub import <entity> <file> [--owner U] [--format csv|xlsx] [--db PATH]
  datanaut-datahub export <entity> [--owner U] [--format F] [--out PATH] [--db PATH]
  datanaut-datahub template <entity> [--format F] [--out PATH] [--db PATH]
  datanaut-datahub entities [--owner U] [--db PATH]";

/// 解析后的命令行参数
#[derive(Debug, Default)]
struct CliArgs {
    positional: Vec<String>,
    owner: Option<String>,
    format: Option<String>,
    out: Option<PathBuf>,
    db: Option<String>,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = CliArgs::default();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .filter(|v| !v.starts_with("--"))
                    .with_context(|| format!("{} requires a value", flag))
            };
            match arg.as_str() {
                "--owner" => parsed.owner = Some(value("--owner")?),
                "--format" => parsed.format = Some(value("--format")?),
                "--out" => parsed.out = Some(PathBuf::from(value("--out")?)),
                "--db" => parsed.db = Some(value("--db")?),
                flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
                _ => parsed.positional.push(arg.clone()),
            }
        }
        Ok(parsed)
    }

    fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or("system")
    }

    fn positional(&self, idx: usize, name: &str) -> Result<&str> {
        self.positional
            .get(idx)
            .map(String::as_str)
            .with_context(|| format!("missing <{}>\n{}", name, USAGE))
    }

    fn open_api(&self) -> Result<DataHubApi> {
        let db_path = self.db.clone().unwrap_or_else(get_default_db_path);
        tracing::info!(db_path = %db_path, "使用数据库");
        DataHubApi::new(&db_path).with_context(|| format!("cannot open database {}", db_path))
    }
}

/// 写出文件并返回实际路径
fn save(file: &ExportFile, out: Option<&PathBuf>) -> Result<PathBuf> {
    let path = out.cloned().unwrap_or_else(|| PathBuf::from(&file.filename));
    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}

fn run(command: &str, args: &CliArgs) -> Result<serde_json::Value> {
    match command {
        "import" => {
            let entity = args.positional(0, "entity")?;
            let file = args.positional(1, "file")?;
            let upload = UploadedFile::from_path(file)?;
            let response = args
                .open_api()?
                .import(entity, &upload, args.owner(), args.format.as_deref())?;
            Ok(serde_json::to_value(response)?)
        }
        "export" | "template" => {
            let entity = args.positional(0, "entity")?;
            let api = args.open_api()?;
            let file = if command == "export" {
                api.export(entity, args.owner(), args.format.as_deref())?
            } else {
                api.template(entity, args.format.as_deref())?
            };
            let path = save(&file, args.out.as_ref())?;
            Ok(json!({
                "filename": file.filename,
                "content_type": file.content_type,
                "bytes": file.bytes.len(),
                "path": path.display().to_string(),
            }))
        }
        "entities" => Ok(serde_json::to_value(args.open_api()?.list_entities(args.owner())?)?),
        other => bail!("unknown command {}\n{}", other, USAGE),
    }
}

fn main() -> Result<()> {
    logging::init();

    let mut argv = std::env::args().skip(1);
    let Some(command) = argv.next() else {
        bail!("{}", USAGE);
    };
    let args = CliArgs::parse(argv)?;

    tracing::debug!(command = %command, version = datanaut_datahub::VERSION, "启动");
    let output = run(&command, &args)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
