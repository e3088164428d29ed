use crate::libs::phylo::{Outgroup, OutgroupPolicy};
use anyhow::{anyhow, bail, Context};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// File holding the samples of site `index`
///
/// ```
/// use pbsub::libs::mapping::site_path;
/// assert_eq!(site_path("data/gtr", 3), "data/gtr_3.map");
/// ```
pub fn site_path(prefix: &str, index: usize) -> String {
    format!("{}_{}.map", prefix, index)
}

/// Sequential reader of mapping samples.
///
/// A sample is one mapping line followed by `skip` companion lines, which are
/// discarded. The companion lines of the last sample may be cut off by EOF.
pub struct SampleReader<R: BufRead> {
    reader: R,
    skip: usize,
    source: String,
    read: usize,
}

impl<R: BufRead> SampleReader<R> {
    pub fn new(reader: R, skip: usize, source: &str) -> Self {
        Self {
            reader,
            skip,
            source: source.to_string(),
            read: 0,
        }
    }

    /// Number of samples read so far
    pub fn n_read(&self) -> usize {
        self.read
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Next mapping line, without its line ending
    pub fn next_sample(&mut self) -> anyhow::Result<String> {
        match self.try_next_sample()? {
            Some(line) => Ok(line),
            None => bail!(
                "{}: missing sample {}, the file ends after {} samples",
                self.source,
                self.read + 1,
                self.read
            ),
        }
    }

    /// Next mapping line, or `None` at EOF
    pub fn try_next_sample(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .with_context(|| format!("Failed to read {}", self.source))?;
        if n == 0 {
            return Ok(None);
        }

        let mut discard = String::new();
        for _ in 0..self.skip {
            discard.clear();
            let n = self
                .reader
                .read_line(&mut discard)
                .with_context(|| format!("Failed to read {}", self.source))?;
            if n == 0 {
                break;
            }
        }

        self.read += 1;
        Ok(Some(line.trim_end().to_string()))
    }
}

/// Read `iterations` samples from `reader`.
pub fn read_samples<R: BufRead>(
    reader: R,
    iterations: usize,
    skip: usize,
) -> anyhow::Result<Vec<String>> {
    let mut samples = SampleReader::new(reader, skip, "input");
    (0..iterations).map(|_| samples.next_sample()).collect()
}

/// Open the samples of site `index`
pub fn open_site(
    prefix: &str,
    index: usize,
    skip: usize,
) -> anyhow::Result<SampleReader<BufReader<File>>> {
    let path = site_path(prefix, index);
    let file = File::open(&path).with_context(|| format!("Failed to open {}", path))?;
    Ok(SampleReader::new(BufReader::new(file), skip, &path))
}

/// Outgroup names: the first line is their count, one name per following line.
pub fn load_outgroup<R: BufRead>(reader: R) -> anyhow::Result<Vec<String>> {
    let mut lines = reader.lines();

    let first = lines
        .next()
        .ok_or_else(|| anyhow!("Empty outgroup list"))??;
    let n: usize = first
        .trim()
        .parse()
        .with_context(|| format!("Outgroup count is not a number: {:?}", first.trim()))?;

    let mut names = Vec::with_capacity(n);
    for line in lines.take(n) {
        names.push(line?.trim().to_string());
    }
    if names.len() < n {
        bail!("Outgroup list declares {} names but holds {}", n, names.len());
    }
    Ok(names)
}

/// Outgroup read from `infile`
pub fn outgroup_from_file(infile: &str, policy: OutgroupPolicy) -> anyhow::Result<Outgroup> {
    let file = File::open(infile).with_context(|| format!("Failed to open {}", infile))?;
    let names = load_outgroup(BufReader::new(file))
        .with_context(|| format!("Invalid outgroup file {}", infile))?;
    Ok(Outgroup::new(names, policy))
}
