//! 测试用的假转换器脚本：遵循 `--convert-to`/`--outdir` 参数约定。
//!
//! 输入文件主干决定行为：`fail*` 非零退出，`silent*` 成功但不产出，
//! `slow*` 先睡眠五秒。

use std::path::{Path, PathBuf};

const FAKE_CONVERTER: &str = r#"#!/bin/sh
fmt=""
out=""
in=""
while [ $# -gt 0 ]; do
  case "$1" in
    --convert-to) fmt="$2"; shift 2 ;;
    --outdir) out="$2"; shift 2 ;;
    -*) shift ;;
    *) in="$1"; shift ;;
  esac
done
name=$(basename "$in")
stem="${name%.*}"
case "$stem" in
  fail*) echo "source file could not be loaded" >&2; exit 3 ;;
  silent*) exit 0 ;;
  slow*) sleep 5 ;;
esac
ext="${fmt%%:*}"
case "$ext" in
  html)
    printf '<html><body>%s</body></html>' "$stem" > "$out/$stem.html"
    printf 'PNG' > "$out/${stem}_html_1.png"
    printf 'GIF' > "$out/${stem}_html_2.gif"
    ;;
  *)
    printf 'converted %s' "$name" > "$out/$stem.$ext"
    ;;
esac
exit 0
"#;

/// 在 `dir` 下写入可执行的假转换器并返回其路径。
#[cfg(unix)]
pub fn install_fake_converter(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin_dir = dir.join("bin");
    std::fs::create_dir_all(&bin_dir).expect("create bin dir");
    let path = bin_dir.join("fake-office");
    std::fs::write(&path, FAKE_CONVERTER).expect("write fake converter");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake converter");
    path
}
