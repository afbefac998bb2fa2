use rimpatch_core::{Version, XmlNode};
use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

#[allow(dead_code)]
pub fn xml(text: &str) -> XmlNode {
    XmlNode::parse(text).unwrap()
}

/// Write `contents` to `root/relative`, creating parent directories
#[allow(dead_code)]
pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Create a unit directory with an About.xml
#[allow(dead_code)]
pub fn write_unit(root: &Path, dir: &str, package_id: &str, name: &str, versions: &[&str]) -> PathBuf {
    let versions: String = versions.iter().map(|v| format!("<li>{}</li>", v)).collect();
    write_file(
        root,
        &format!("{}/About/About.xml", dir),
        &format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<ModMetaData><packageId>{}</packageId><name>{}</name><supportedVersions>{}</supportedVersions></ModMetaData>",
            package_id, name, versions
        ),
    );
    root.join(dir)
}
