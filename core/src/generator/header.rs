//! License header, package clause, import block and the package `doc.go`.

use super::{deps, GeneratedFile, GENERATOR_VERSION};
use crate::emit;
use crate::emitter::Emitter;
use crate::imports::{sort_imports, ImportSet};
use crate::options::GeneratorOptions;

const LICENSE: &str = "\
// Licensed under the Apache License, Version 2.0 (the \"License\");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an \"AS IS\" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
";

/// Everything above the first declaration of a Go file.
///
/// The import block separates standard-library imports from the rest with a blank line.
pub(super) fn file_header(options: &GeneratorOptions, imports: &ImportSet, doc: Option<&str>) -> String {
    let mut em = Emitter::new();
    match options.copyright_year {
        Some(year) => emit!(em, "// Copyright {} Google LLC", year),
        None => em.line("// Copyright Google LLC"),
    }
    em.line("//");
    em.raw().push_str(LICENSE);
    em.blank();
    em.line("// Code generated by protoc-gen-go_gapic. DO NOT EDIT.");
    em.blank();
    if let Some(doc) = doc {
        em.comment(doc);
    }
    emit!(em, "package {}", options.pkg_name);
    em.blank();

    if !imports.is_empty() {
        let (sorted, boundary) = sort_imports(imports);
        em.line("import (");
        em.enter();
        for (i, spec) in sorted.iter().enumerate() {
            if i == boundary && boundary > 0 {
                em.blank();
            }
            emit!(em, "{}", spec);
        }
        em.leave();
        em.line(")");
        em.blank();
    }
    em.into_string()
}

/// Package-level helpers shared by every client of the package.
pub(super) fn package_doc(options: &GeneratorOptions) -> GeneratedFile {
    let mut imports = ImportSet::new();
    imports.insert(deps::context());
    imports.insert(deps::metadata());
    for path in ["runtime", "strings", "unicode"] {
        imports.insert(crate::imports::ImportSpec::path(path));
    }
    let doc = format!(
        "Package {} is an auto-generated package for the API clients of {}.",
        options.pkg_name, options.pkg_path
    );
    let mut content = file_header(options, &imports, Some(&doc));

    let mut em = Emitter::new();
    em.line("func insertMetadata(ctx context.Context, mds ...metadata.MD) context.Context {");
    em.line("out, _ := metadata.FromOutgoingContext(ctx)");
    em.line("out = out.Copy()");
    em.line("for _, md := range mds {");
    em.line("for k, v := range md {");
    em.line("out[k] = append(out[k], v...)");
    em.line("}");
    em.line("}");
    em.line("return metadata.NewOutgoingContext(ctx, out)");
    em.line("}");
    em.blank();
    em.line("// versionGo returns the Go runtime version. The returned string");
    em.line("// has no whitespace, suitable for reporting in header.");
    em.line("func versionGo() string {");
    em.line("const develPrefix = \"devel +\"");
    em.blank();
    em.line("s := runtime.Version()");
    em.line("if strings.HasPrefix(s, develPrefix) {");
    em.line("s = s[len(develPrefix):]");
    em.line("if p := strings.IndexFunc(s, unicode.IsSpace); p >= 0 {");
    em.line("s = s[:p]");
    em.line("}");
    em.line("return s");
    em.line("}");
    em.blank();
    em.line("notSemverRune := func(r rune) bool {");
    em.line("return !strings.ContainsRune(\"0123456789.\", r)");
    em.line("}");
    em.blank();
    em.line("if strings.HasPrefix(s, \"go1\") {");
    em.line("s = s[2:]");
    em.line("var prerelease string");
    em.line("if p := strings.IndexFunc(s, notSemverRune); p >= 0 {");
    em.line("s, prerelease = s[:p], s[p:]");
    em.line("}");
    em.line("if strings.HasSuffix(s, \".\") {");
    em.line("s += \"0\"");
    em.line("} else if strings.Count(s, \".\") < 2 {");
    em.line("s += \".0\"");
    em.line("}");
    em.line("if prerelease != \"\" {");
    em.line("s += \"-\" + prerelease");
    em.line("}");
    em.line("return s");
    em.line("}");
    em.line("return \"UNKNOWN\"");
    em.line("}");
    em.blank();
    em.line("// versionClient is the version of the generator that produced this package.");
    emit!(em, "const versionClient = {:?}", GENERATOR_VERSION);

    content.push_str(&em.into_string());
    GeneratedFile {
        name: options.output_file("doc.go"),
        content,
    }
}
