//! Test helpers for laying out CLI input files in a scratch directory.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) const OURS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="fixture">
  <node id="1" lat="40.500" lon="-74.450"/>
  <node id="2" lat="40.501" lon="-74.450"/>
  <node id="3" lat="40.501" lon="-74.449"/>
  <node id="4" lat="40.500" lon="-74.449"/>
  <way id="1">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <nd ref="4"/>
    <nd ref="1"/>
    <tag k="building" v="yes"/>
  </way>
</osm>"#;

pub(super) const CANDIDATES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="fixture">
  <node id="501" version="3" lat="40.500" lon="-74.450"/>
  <node id="502" version="3" lat="40.501" lon="-74.450"/>
  <node id="503" version="3" lat="40.501" lon="-74.449"/>
  <node id="504" version="3" lat="40.500" lon="-74.449"/>
  <way id="700" version="6">
    <nd ref="501"/>
    <nd ref="502"/>
    <nd ref="503"/>
    <nd ref="504"/>
    <nd ref="501"/>
    <tag k="building" v="yes"/>
  </way>
</osm>"#;

pub(super) const DIFF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osmChange version="0.6" generator="fixture">
  <create>
    <node id="-1" lat="40.5005" lon="-74.4495"/>
  </create>
  <delete>
    <node id="9" version="4" lat="40.600" lon="-74.300"/>
  </delete>
</osmChange>"#;

pub(super) const CAMPUS: &str =
    "POLYGON((-74.46 40.49, -74.46 40.51, -74.44 40.51, -74.44 40.49, -74.46 40.49))";

pub(super) const MUNICIPAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="fixture">
  <way id="-4">
    <tag k="BldgName" v="Alexander Library"/>
    <tag k="City" v="NEW BRUNSWICK"/>
  </way>
</osm>"#;

pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &str) {
    fs::write(path.as_std_path(), contents).expect("write fixture");
}
