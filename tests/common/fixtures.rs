//! Test fixtures - sample formulas and index documents.

#![allow(dead_code)]

use serde_json::{json, Value};

/// Canonical sdist location for `name==version`
pub fn sdist_url(name: &str, version: &str) -> String {
    format!(
        "https://files.pythonhosted.org/packages/ab/cd/{}-{}.tar.gz",
        name, version
    )
}

/// Formula with no resource blocks.
pub fn simple_formula(class: &str, name: &str, version: &str, sha256: &str) -> String {
    format!(
        r#"class {class} < Formula
  include Language::Python::Virtualenv

  desc "Test formula for {name}"
  homepage "https://example.com/{name}"
  url "{url}"
  sha256 "{sha256}"
  license "MIT"

  depends_on "python@3.12"

  def install
    virtualenv_install_with_resources
  end

  test do
    system bin/"{name}", "--version"
  end
end
"#,
        url = sdist_url(name, version),
    )
}

/// httpie 3.2.1 with two existing resource blocks.
pub const HTTPIE_WITH_RESOURCES: &str = r##"class Httpie < Formula
  include Language::Python::Virtualenv

  desc "User-friendly cURL replacement"
  homepage "https://httpie.io/"
  url "https://files.pythonhosted.org/packages/ab/cd/httpie-3.2.1.tar.gz"
  sha256 "1111111111111111111111111111111111111111111111111111111111111111"
  license "BSD-3-Clause"

  depends_on "python@3.12"

  resource "certifi" do
    url "https://files.pythonhosted.org/packages/ab/cd/certifi-2023.7.22.tar.gz"
    sha256 "2222222222222222222222222222222222222222222222222222222222222222"
  end

  resource "requests" do
    url "https://files.pythonhosted.org/packages/ab/cd/requests-2.31.0.tar.gz"
    sha256 "3333333333333333333333333333333333333333333333333333333333333333"
  end

  def install
    virtualenv_install_with_resources
  end

  test do
    assert_match version.to_s, shell_output("#{bin}/http --version")
  end
end
"##;

/// Formula tracking a GitHub archive; version comes from the literal.
pub const GITHUB_ARCHIVE_FORMULA: &str = r#"class Toolz < Formula
  desc "Functional utilities"
  url "https://github.com/pytoolz/toolz/archive/refs/tags/v0.12.0.tar.gz"
  version "0.12.0"
  sha256 "4444444444444444444444444444444444444444444444444444444444444444"

  def install
    virtualenv_install_with_resources
  end
end
"#;

/// Formula whose primary url has no checksum after it.
pub const MISSING_CHECKSUM_FORMULA: &str = r#"class Nohash < Formula
  url "https://files.pythonhosted.org/packages/ab/cd/nohash-1.0.tar.gz"
  license "MIT"

  def install
    virtualenv_install_with_resources
  end
end
"#;

/// JSON API document for one release with a single sdist.
pub fn release_document(package: &str, version: &str, url: &str, sha256: &str) -> Value {
    json!({
        "info": { "name": package, "version": version },
        "urls": [
            {
                "packagetype": "bdist_wheel",
                "filename": format!("{}-{}-py3-none-any.whl", package, version),
                "url": url.replace(".tar.gz", "-py3-none-any.whl"),
                "digests": { "sha256": "ffff" }
            },
            {
                "packagetype": "sdist",
                "filename": format!("{}-{}.tar.gz", package, version),
                "url": url,
                "digests": { "sha256": sha256 }
            }
        ]
    })
}

/// Deterministic fake checksum for `name`
pub fn hash_of(name: &str) -> String {
    format!("{:0<64}", name.replace(['-', '.', '_'], ""))
        .chars()
        .take(64)
        .collect()
}
