// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Read TransXChange documents from a string, a file, a directory or a ZIP
//! archive.

use crate::{bank_holidays::BankHolidays, configuration::Configuration, Result, TransXChange};
use anyhow::Context;
use minidom::Element;
use std::{
    ffi::OsStr,
    fs::File,
    io::Read,
    path::Path,
};
use tracing::info;
use walkdir::WalkDir;
use zip::ZipArchive;

fn is_xml(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("xml"))
}

fn read_document(content: &str, bank_holidays: &BankHolidays) -> Result<TransXChange> {
    let root: Element = content.parse()?;
    TransXChange::with_bank_holidays(&root, bank_holidays.clone())
}

fn read_file(path: &Path, bank_holidays: &BankHolidays) -> Result<TransXChange> {
    info!("reading TransXChange file {:?}", path);
    let mut content = String::new();
    File::open(path)?.read_to_string(&mut content)?;
    read_document(&content, bank_holidays).with_context(|| format!("Error reading {:?}", path))
}

fn read_from_zip(path: &Path, bank_holidays: &BankHolidays) -> Result<Vec<TransXChange>> {
    let zip_file = File::open(path).with_context(|| format!("Error reading {:?}", path))?;
    let mut zip_archive = ZipArchive::new(zip_file)?;
    let mut documents = Vec::new();
    for index in 0..zip_archive.len() {
        let mut file = zip_archive.by_index(index)?;
        match file.enclosed_name() {
            Some(file_name) if is_xml(&file_name) => {
                info!("reading TransXChange file {:?}", file_name);
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                documents.push(skip_fail!(read_document(&content, bank_holidays)
                    .with_context(|| format!("Error reading {:?} in {:?}", file_name, path))));
            }
            file_name => {
                info!("skipping file in zip: {:?}", file_name);
            }
        }
    }
    Ok(documents)
}

fn read_from_path(path: &Path, bank_holidays: &BankHolidays) -> Result<Vec<TransXChange>> {
    let mut documents = Vec::new();
    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        if is_xml(entry.path()) {
            documents.push(skip_fail!(read_file(entry.path(), bank_holidays)));
        } else {
            info!("skipping file: {:?}", entry.path());
        }
    }
    Ok(documents)
}

/// Read one TransXChange document held in a string. Only the fixed bank
/// holidays are known.
pub fn read_str(xml: &str) -> Result<TransXChange> {
    read_document(xml, &BankHolidays::default())
}

/// Read every TransXChange document at `path`: a single XML file, a ZIP
/// archive or a directory, walked recursively. Documents come in file name
/// order. In a directory or an archive, a document that cannot be read is
/// skipped with a warning.
pub fn read<P: AsRef<Path>>(path: P, configuration: &Configuration) -> Result<Vec<TransXChange>> {
    let path = path.as_ref();
    let bank_holidays = configuration.bank_holidays()?;
    if path.is_dir() {
        read_from_path(path, &bank_holidays)
    } else if path.extension() == Some(OsStr::new("zip")) {
        read_from_zip(path, &bank_holidays)
    } else {
        Ok(vec![read_file(path, &bank_holidays)?])
    }
}
